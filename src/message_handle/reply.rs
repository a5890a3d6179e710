use crate::extract::ExtractedRecord;
use crate::processor::{DispatchError, RecordPayload};
use serde::Deserialize;
use serde_json::Value;

pub const PROCESSING_NOTICE: &str = "⏳ Processing your request... This may take up to 5 minutes.";
pub const COMMAND_FAILED: &str = "❌ Error processing the command";

const NOT_FOUND: &str = "Not found";

/// Summary of an extracted record. The five dispatch fields always get a line.
pub fn summary(record: &ExtractedRecord) -> String {
    let mut text = String::from("📋 *Extracted Data:*\n\n");
    if let Some(name) = &record.driver_name {
        text.push_str(&format!("👤 *Driver Name:* {}\n", name));
    }
    if let Some(license) = &record.driver_license {
        text.push_str(&format!("🆔 *License (Last 4):* {}\n", license));
    }
    let or_missing = |field: &Option<String>| field.clone().unwrap_or_else(|| NOT_FOUND.to_string());
    text.push_str(&format!("🚛 *Vehicle Number:* {}\n", or_missing(&record.vehicle_number)));
    text.push_str(&format!("📍 *Destination:* {}\n", or_missing(&record.destination)));
    text.push_str(&format!("⚖️ *Weight:* {}\n", or_missing(&record.weight)));
    text.push_str(&format!("📋 *SO Number:* {}\n", or_missing(&record.so_number)));
    text.push_str(&format!("📞 *Phone Number:* {}\n", or_missing(&record.phone_number)));
    text
}

pub fn processing_succeeded(processed: Option<&RecordPayload>) -> String {
    let mut text = String::from("✅ *Processing Completed Successfully!*\n\n📋 *Processed Data:*\n");
    if let Some(data) = processed {
        let lines = [
            ("👤 Driver Name", &data.driver_name, ""),
            ("🆔 License", &data.driver_license, ""),
            ("🚛 Vehicle", &data.vehicle_num, ""),
            ("📍 Destination", &data.destination, ""),
            ("⚖️ Weight", &data.weight, " MT"),
            ("📋 SO Number", &data.so_no, ""),
            ("📞 Phone", &data.phone_num, ""),
        ];
        for (label, value, unit) in lines {
            if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
                text.push_str(&format!("{}: {}{}\n", label, value, unit));
            }
        }
    }
    text.push_str("\n🎉 All processes executed successfully!");
    text
}

pub fn processing_failed(error: &DispatchError) -> String {
    format!(
        "❌ *Processing Failed*\n\n*Error:* {}\n\n🔄 Please try again or contact support if the issue persists.",
        error
    )
}

/// Optional payload of a status push. Values may be any JSON type.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusData {
    pub result: Option<Value>,
    pub error: Option<Value>,
    pub message: Option<Value>,
}

/// Chat rendering of a pushed value: strings as they are, anything else as
/// JSON. Null, false, zero and empty strings count as absent.
fn pushed_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Chat text for a status pushed by the processing service.
pub fn status_text(status: &str, data: Option<&StatusData>) -> String {
    match status {
        "processing" => "⏳ Processing your data...".to_string(),
        "completed" => match pushed_text(data.and_then(|data| data.result.as_ref())) {
            Some(result) => format!("✅ Processing completed successfully!\n\n📊 *Result:*\n{}", result),
            None => "✅ Processing completed successfully!".to_string(),
        },
        "error" => match pushed_text(data.and_then(|data| data.error.as_ref())) {
            Some(error) => format!("❌ An error occurred during processing\n\n*Error:* {}", error),
            None => "❌ An error occurred during processing".to_string(),
        },
        "custom" => pushed_text(data.and_then(|data| data.message.as_ref()))
            .unwrap_or_else(|| "Status update".to_string()),
        other => format!("📋 Status: {}", other),
    }
}
