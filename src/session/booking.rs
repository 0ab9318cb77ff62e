//! Booking details attached to a session
//!
//! Only what the storage core needs: the couple's names for wedding folders
//! and the fields rendered into the metadata file.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::session::naming::{COUPLE_CONNECTOR, SessionKey};

/// Wedding bookings name the folder after both parties
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WeddingDetails {
    pub groom_name: String,
    pub bride_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BookingDetails {
    pub category: Option<String>,
    pub package_name: Option<String>,
    pub phone: Option<String>,
    pub total_amount: f64,
    pub paid_amount: f64,
    pub notes: Option<String>,
    pub wedding: Option<WeddingDetails>,
}

impl BookingDetails {
    pub fn balance(&self) -> f64 {
        self.total_amount - self.paid_amount
    }

    /// `{groom}_و_{bride}` when both wedding names are present
    pub fn couple_name(&self) -> Option<String> {
        let wedding = self.wedding.as_ref()?;
        let groom = wedding.groom_name.trim();
        let bride = wedding.bride_name.trim();
        if groom.is_empty() || bride.is_empty() {
            return None;
        }
        Some(format!("{}{}{}", groom, COUPLE_CONNECTOR, bride))
    }

    fn category_label(&self) -> String {
        match (&self.category, &self.wedding) {
            (Some(c), _) if !c.trim().is_empty() => c.trim().to_string(),
            (_, Some(_)) => "wedding".to_string(),
            _ => "-".to_string(),
        }
    }
}

fn or_dash(value: &Option<String>) -> &str {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or("-")
}

/// Text of the booking metadata file
pub fn render_booking_metadata(key: &SessionKey, details: &BookingDetails) -> String {
    let mut out = String::new();
    out.push_str("BOOKING DETAILS\n");
    out.push_str("===============\n\n");
    out.push_str(&format!("Client:      {}\n", key.display_name()));
    out.push_str(&format!("Session ID:  {}\n", key.session_id));
    out.push_str(&format!("Date:        {}\n", key.date.format("%Y-%m-%d")));
    out.push_str(&format!("Category:    {}\n", details.category_label()));
    if let Some(w) = &details.wedding {
        out.push_str(&format!("Groom:       {}\n", w.groom_name));
        out.push_str(&format!("Bride:       {}\n", w.bride_name));
    }
    out.push_str(&format!("Package:     {}\n", or_dash(&details.package_name)));
    out.push_str(&format!("Phone:       {}\n", or_dash(&details.phone)));
    out.push_str(&format!("Total:       {:.2}\n", details.total_amount));
    out.push_str(&format!("Paid:        {:.2}\n", details.paid_amount));
    out.push_str(&format!("Balance:     {:.2}\n", details.balance()));
    out.push_str(&format!("Notes:       {}\n", or_dash(&details.notes)));
    out.push_str(&format!(
        "\nUpdated:     {}\n",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wedding(groom: &str, bride: &str) -> BookingDetails {
        BookingDetails {
            wedding: Some(WeddingDetails {
                groom_name: groom.into(),
                bride_name: bride.into(),
            }),
            ..BookingDetails::default()
        }
    }

    #[test]
    fn couple_name_joins_with_connector() {
        assert_eq!(wedding("Ali", "Sara").couple_name().as_deref(), Some("Ali_و_Sara"));
    }

    #[test]
    fn half_filled_wedding_is_ignored() {
        assert_eq!(wedding("Ali", " ").couple_name(), None);
    }

    #[test]
    fn metadata_contains_balance() {
        let details = BookingDetails {
            total_amount: 5000.0,
            paid_amount: 1500.0,
            package_name: Some("Gold".into()),
            ..wedding("Ali", "Sara")
        };
        let key = SessionKey::new("Ali", "S9", "2026-05-01", Some(details.clone())).unwrap();
        let text = render_booking_metadata(&key, &details);
        assert!(text.contains("Balance:     3500.00"));
        assert!(text.contains("Category:    wedding"));
        assert!(text.contains("Session ID:  S9"));
    }
}
