// 📦 Payload builders - text that ends up inside a QR code, and the files it lands in

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// WI-FI LOGIN
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WifiEncryption {
    #[default]
    #[serde(rename = "WPA")]
    Wpa,
    #[serde(rename = "WEP")]
    Wep,
    #[serde(rename = "nopass")]
    NoPass,
}

impl WifiEncryption {
    pub fn as_str(&self) -> &'static str {
        match self {
            WifiEncryption::Wpa => "WPA",
            WifiEncryption::Wep => "WEP",
            WifiEncryption::NoPass => "nopass",
        }
    }
}

impl fmt::Display for WifiEncryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WifiEncryption {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WPA" => Ok(WifiEncryption::Wpa),
            "WEP" => Ok(WifiEncryption::Wep),
            "nopass" => Ok(WifiEncryption::NoPass),
            _ => Err(StoreError::validation(
                "encryption",
                "Encryption must be one of WPA, WEP, nopass.",
            )),
        }
    }
}

/// Build the `WIFI:S:<ssid>;T:<enc>;P:<password>;;` login string
pub fn wifi_payload(ssid: &str, password: &str, encryption: WifiEncryption) -> Result<String, StoreError> {
    let ssid = ssid.trim();
    if ssid.is_empty() {
        return Err(StoreError::validation("ssid", "Network Name (SSID) is required."));
    }

    Ok(format!(
        "WIFI:S:{};T:{};P:{};;",
        ssid,
        encryption,
        password.trim()
    ))
}

// ============================================================================
// FILE NAMES
// ============================================================================

/// Image file name for a product's QR code: alphanumerics, `-` and `_` only
pub fn product_qr_filename(product_id: &str) -> String {
    let safe: String = product_id
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    format!("{}.png", safe)
}

// ============================================================================
// DECODING
// ============================================================================

/// Decode scanner output as UTF-8, dropping invalid byte sequences
pub fn payload_from_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
