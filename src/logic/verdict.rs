//! Result Aggregator
//!
//! Maps raw feature slots and the classifier label into the caller-facing
//! verdict. Binary signals are `true`, `false`, or the literal `"invalid"`.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

use crate::logic::features::{Feature, FeatureVector};
use crate::logic::model::Label;

/// A named boolean signal that may be undeterminable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Flag(bool),
    Invalid,
}

const INVALID: &str = "invalid";

impl Signal {
    /// 0 → false, 1 → true, anything else → invalid
    pub fn from_binary(value: f32) -> Self {
        if value == 0.0 {
            Signal::Flag(false)
        } else if value == 1.0 {
            Signal::Flag(true)
        } else {
            Signal::Invalid
        }
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, Signal::Invalid)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Flag(flag) => write!(f, "{}", flag),
            Signal::Invalid => f.write_str(INVALID),
        }
    }
}

impl Serialize for Signal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Signal::Flag(flag) => serializer.serialize_bool(*flag),
            Signal::Invalid => serializer.serialize_str(INVALID),
        }
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SignalVisitor;

        impl<'de> Visitor<'de> for SignalVisitor {
            type Value = Signal;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean or \"invalid\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Signal, E> {
                Ok(Signal::Flag(value))
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Signal, E> {
                if value == INVALID {
                    Ok(Signal::Invalid)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(value), &self))
                }
            }
        }

        deserializer.deserialize_any(SignalVisitor)
    }
}

/// Caller-facing classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub ssl_certificate: Signal,
    pub temporary_domain: Signal,
    pub in_reputation_database: Signal,
    /// Only a clean `0` clears this flag; unknown counts as abnormal
    pub abnormal_url: bool,
    /// True when the classifier labels the URL malicious
    pub result: bool,
}

impl Verdict {
    pub fn aggregate(features: &FeatureVector, label: Label) -> Self {
        Self {
            ssl_certificate: Signal::from_binary(features.get(Feature::SslCertificate)),
            temporary_domain: Signal::from_binary(features.get(Feature::TemporaryDomain)),
            in_reputation_database: Signal::from_binary(features.get(Feature::ReputationDatabase)),
            abnormal_url: features.get(Feature::AbnormalUrl) != 0.0,
            result: label.is_malicious(),
        }
    }
}
