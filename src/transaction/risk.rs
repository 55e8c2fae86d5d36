//! Rule-based risk scoring for card payments, and a generator of mock
//! payments used to feed the ledger with demonstration traffic.

use chrono::{DateTime, Timelike};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Transaction;
use crate::blockchain::iso_timestamp_now;

pub const HIGH_AMOUNT_THRESHOLD: f64 = 5000.0;
pub const VELOCITY_THRESHOLD: u32 = 5;
pub const UNUSUAL_HOURS: [u32; 4] = [2, 3, 4, 5];
pub const SUSPICIOUS_LOCATIONS: [&str; 2] = ["Unknown", "High Risk Zone"];
pub const CARD_TESTING_AMOUNTS: [f64; 5] = [1.0, 5.0, 10.0, 25.0, 50.0];

/// Score at or above which a payment is flagged.
pub const FRAUD_THRESHOLD: u32 = 50;

const MERCHANTS: [&str; 5] = ["AMAZON", "WALMART", "TARGET", "BESTBUY", "COSTCO"];
const LOCATIONS: [&str; 6] = [
    "New York",
    "Los Angeles",
    "Chicago",
    "Houston",
    "Unknown",
    "Foreign-Brazil",
];
const AMOUNTS: [f64; 16] = [
    29.99, 149.99, 599.99, 1299.99, 2599.99, 2099.99, 199.99, 499.99, 1699.99, 1999.99, 99.99,
    25.0, 1.0, 5.0, 10.0, 7850.0,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    fn from_score(score: u32) -> Self {
        match score {
            s if s >= 70 => RiskLevel::Critical,
            s if s >= 50 => RiskLevel::High,
            s if s >= 30 => RiskLevel::Medium,
            _ => RiskLevel::Low,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub is_fraudulent: bool,
    pub risk_score: u32,
    pub trust_score: u32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
}

/// A scored card payment as produced by [`generate_mock_payment`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub timestamp: String,
    pub amount: f64,
    pub card_number: String,
    pub merchant_id: String,
    pub location: String,
    pub customer_email: String,
    pub is_online: bool,
    pub velocity: u32,
    pub device_fingerprint: String,
    pub ip_address: String,
    pub trust_score: u32,
    pub risk_level: RiskLevel,
    pub is_fraudulent: bool,
    pub fraud_reasons: Vec<String>,
    pub status: String,
}

/// Pure scoring over a payment's observable fields.
pub fn assess(payment: &Payment) -> RiskAssessment {
    let mut reasons = Vec::new();
    let mut score = 0u32;
    let mut flag = |hit: bool, points: u32, reason: &str| {
        if hit {
            score += points;
            reasons.push(reason.to_string());
        }
    };

    flag(
        payment.amount > HIGH_AMOUNT_THRESHOLD,
        10,
        "Unusually high transaction amount",
    );
    flag(
        payment.velocity > VELOCITY_THRESHOLD,
        8,
        "High transaction velocity detected",
    );
    let hour = DateTime::parse_from_rfc3339(&payment.timestamp)
        .map(|t| t.naive_utc().hour())
        .ok();
    flag(
        hour.is_some_and(|h| UNUSUAL_HOURS.contains(&h)),
        5,
        "Transaction at unusual hours (2-5 AM)",
    );
    flag(
        SUSPICIOUS_LOCATIONS.contains(&payment.location.as_str()),
        8,
        "Transaction from high-risk location",
    );
    flag(
        CARD_TESTING_AMOUNTS.contains(&payment.amount),
        12,
        "Amount matches card testing pattern",
    );
    flag(
        payment.device_fingerprint.contains("anomaly"),
        8,
        "Suspicious device fingerprint detected",
    );
    flag(
        payment.location.contains("Foreign"),
        8,
        "Transaction from unusual geographic location",
    );
    flag(
        payment.ip_address.starts_with("192.168.1."),
        5,
        "Transaction from known proxy/VPN",
    );

    RiskAssessment {
        is_fraudulent: score >= FRAUD_THRESHOLD,
        risk_score: score,
        trust_score: 100u32.saturating_sub(score),
        risk_level: RiskLevel::from_score(score),
        reasons,
    }
}

/// Random payment drawn from fixed catalogues, already scored.
pub fn generate_mock_payment() -> Payment {
    let mut rng = rand::thread_rng();

    let mut payment = Payment {
        id: Uuid::new_v4().simple().to_string()[..9].to_string(),
        timestamp: iso_timestamp_now(),
        amount: *AMOUNTS.choose(&mut rng).unwrap_or(&AMOUNTS[0]),
        card_number: format!("****-****-****-{}", rng.gen_range(1000..10000)),
        merchant_id: MERCHANTS.choose(&mut rng).unwrap_or(&MERCHANTS[0]).to_string(),
        location: LOCATIONS.choose(&mut rng).unwrap_or(&LOCATIONS[0]).to_string(),
        customer_email: format!("customer{}@email.com", rng.gen_range(0..1000)),
        is_online: rng.gen_bool(0.7),
        velocity: rng.gen_range(0..4),
        device_fingerprint: if rng.gen_bool(0.2) {
            "device-anomaly-detected".into()
        } else {
            "device-normal".into()
        },
        ip_address: format!("192.168.1.{}", rng.gen_range(0..255)),
        trust_score: 0,
        risk_level: RiskLevel::Low,
        is_fraudulent: false,
        fraud_reasons: Vec::new(),
        status: "pending".into(),
    };

    let assessment = assess(&payment);
    payment.trust_score = assessment.trust_score;
    payment.risk_level = assessment.risk_level;
    payment.is_fraudulent = assessment.is_fraudulent;
    payment.fraud_reasons = assessment.reasons;
    payment.status = if payment.is_fraudulent {
        "flagged".into()
    } else {
        "approved".into()
    };
    payment
}

impl Payment {
    /// Map onto a ledger record: customer pays merchant, everything else rides along.
    pub fn into_transaction(self) -> Transaction {
        Transaction::new(
            self.customer_email,
            self.merchant_id,
            self.amount,
            self.timestamp,
        )
        .with_field("id", self.id)
        .with_field("cardNumber", self.card_number)
        .with_field("location", self.location)
        .with_field("isOnline", self.is_online)
        .with_field("velocity", self.velocity)
        .with_field("deviceFingerprint", self.device_fingerprint)
        .with_field("ipAddress", self.ip_address)
        .with_field("trustScore", self.trust_score)
        .with_field("riskLevel", serde_json::to_value(self.risk_level).unwrap_or(Value::Null))
        .with_field("isFraudulent", self.is_fraudulent)
        .with_field("fraudReasons", self.fraud_reasons)
        .with_field("status", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_payment() -> Payment {
        Payment {
            id: "abc".into(),
            timestamp: "2026-03-01T14:00:00.000Z".into(),
            amount: 149.99,
            card_number: "****-****-****-1234".into(),
            merchant_id: "TARGET".into(),
            location: "Chicago".into(),
            customer_email: "customer1@email.com".into(),
            is_online: true,
            velocity: 1,
            device_fingerprint: "device-normal".into(),
            ip_address: "10.0.0.7".into(),
            trust_score: 0,
            risk_level: RiskLevel::Low,
            is_fraudulent: false,
            fraud_reasons: Vec::new(),
            status: "pending".into(),
        }
    }

    #[test]
    fn clean_payment_scores_zero() {
        let a = assess(&clean_payment());
        assert_eq!(a.risk_score, 0);
        assert_eq!(a.trust_score, 100);
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert!(!a.is_fraudulent);
        assert!(a.reasons.is_empty());
    }

    fn worst_case_payment() -> Payment {
        let mut p = clean_payment();
        p.amount = 10.0;
        p.velocity = 9;
        p.timestamp = "2026-03-01T03:15:00.000Z".into();
        p.location = "Foreign-Brazil".into();
        p.device_fingerprint = "device-anomaly-detected".into();
        p.ip_address = "192.168.1.20".into();
        p
    }

    #[test]
    fn every_rule_contributes() {
        // 12 card testing + 8 velocity + 5 hour + 8 foreign + 8 device + 5 proxy
        let a = assess(&worst_case_payment());
        assert_eq!(a.risk_score, 46);
        assert_eq!(a.trust_score, 54);
        assert_eq!(a.risk_level, RiskLevel::Medium);
        assert_eq!(a.reasons.len(), 6);
        assert!(!a.is_fraudulent);
    }

    #[test]
    fn high_amount_and_listed_location() {
        let mut p = worst_case_payment();
        p.amount = 7850.0;
        p.location = "High Risk Zone".into();
        let a = assess(&p);
        assert_eq!(a.risk_score, 44);
        assert!(a.reasons.iter().any(|r| r.contains("high transaction amount")));
        assert!(a.reasons.iter().any(|r| r.contains("high-risk location")));
    }

    #[test]
    fn unparseable_timestamp_skips_hour_rule() {
        let mut p = worst_case_payment();
        p.timestamp = "not a date".into();
        assert_eq!(assess(&p).risk_score, 41);
    }

    #[test]
    fn critical_level_and_trust_floor() {
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
    }

    #[test]
    fn mock_payment_is_scored_consistently() {
        for _ in 0..20 {
            let p = generate_mock_payment();
            let a = assess(&p);
            assert_eq!(p.trust_score, a.trust_score);
            assert_eq!(p.is_fraudulent, a.is_fraudulent);
            let expected = if a.is_fraudulent { "flagged" } else { "approved" };
            assert_eq!(p.status, expected);
            assert_eq!(p.id.len(), 9);
            assert!(AMOUNTS.contains(&p.amount));
        }
    }

    #[test]
    fn payment_maps_to_ledger_transaction() {
        let tx = clean_payment().into_transaction();
        assert_eq!(tx.from, "customer1@email.com");
        assert_eq!(tx.to, "TARGET");
        assert_eq!(tx.amount, 149.99);
        assert_eq!(tx.extra.get("location"), Some(&Value::from("Chicago")));
        assert_eq!(tx.extra.get("riskLevel"), Some(&Value::from("low")));
        assert!(tx.check_format().is_ok());
    }
}
