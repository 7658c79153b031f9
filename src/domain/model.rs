use serde::{Deserialize, Serialize};
use std::fmt;

/// One e-mail to classify, as read from a single row of the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    #[serde(rename = "email_from")]
    pub sender: String,
    pub subject: String,
    pub body: String,
}

impl InputRecord {
    pub fn new(
        sender: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Lead,
    Customer,
    Spam,
    Newsletter,
}

impl Category {
    /// Case-insensitive match against the labels the prompt asks for.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "lead" => Some(Self::Lead),
            "customer" => Some(Self::Customer),
            "spam" => Some(Self::Spam),
            "newsletter" => Some(Self::Newsletter),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lead => "Lead",
            Self::Customer => "Customer",
            Self::Spam => "Spam",
            Self::Newsletter => "Newsletter",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured outcome for one [`InputRecord`].
///
/// When `parse_error` is set every structured field is `None` and `raw` holds
/// either the unparseable model reply or a provider diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Option<Category>,
    pub urgency: Option<Urgency>,
    pub intent: Option<String>,
    pub suggested_action: Option<String>,
    pub raw: String,
    pub parse_error: bool,
}

impl ClassificationResult {
    pub fn unparsed(raw: impl Into<String>) -> Self {
        Self {
            category: None,
            urgency: None,
            intent: None,
            suggested_action: None,
            raw: raw.into(),
            parse_error: true,
        }
    }

    pub fn provider_failure(diagnostic: impl fmt::Display) -> Self {
        Self::unparsed(format!("Error: {}", diagnostic))
    }

    /// The four classification fields as a JSON object, without `raw`.
    pub fn fields_json(&self) -> serde_json::Value {
        serde_json::json!({
            "category": self.category.map(|c| c.as_str()),
            "urgency": self.urgency.map(|u| u.as_str()),
            "intent": self.intent,
            "suggested_action": self.suggested_action,
        })
    }
}

/// An input row paired with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzedEmail {
    pub record: InputRecord,
    pub result: ClassificationResult,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub total: usize,
    pub parsed: usize,
    pub parse_failures: usize,
    pub provider_failures: usize,
}

/// Ordered results of one run; position `i` corresponds to input row `i`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Batch {
    pub items: Vec<AnalyzedEmail>,
    pub stats: BatchStats,
}

impl Batch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            stats: BatchStats::default(),
        }
    }

    pub fn push(&mut self, record: InputRecord, result: ClassificationResult, provider_failed: bool) {
        self.stats.total += 1;
        if provider_failed {
            self.stats.provider_failures += 1;
        } else if result.parse_error {
            self.stats.parse_failures += 1;
        } else {
            self.stats.parsed += 1;
        }
        self.items.push(AnalyzedEmail { record, result });
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn results(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.items.iter().map(|item| &item.result)
    }
}
