use crate::domain::model::InputRecord;

/// Builds the instruction sent to the model for one e-mail.
///
/// The reply is asked to be a single JSON object with the keys
/// `category`, `urgency`, `intent` and `suggested_action`.
pub fn build_prompt(record: &InputRecord) -> String {
    format!(
        r#"Analyze this email and provide:
1. Category (Lead/Customer/Spam/Newsletter)
2. Urgency (High/Medium/Low)
3. Main intent (in 1 sentence)
4. Suggested action (in 1 sentence)

Email:
From: {sender}
Subject: {subject}
Content: {body}

Respond ONLY in JSON format:
{{
  "category": "Lead/Customer/Spam/Newsletter",
  "urgency": "High/Medium/Low",
  "intent": "brief description",
  "suggested_action": "recommended action"
}}"#,
        sender = record.sender,
        subject = record.subject,
        body = record.body,
    )
}
