//! Digital health score: a fixed-weight 0-100 measure of how visible a
//! business is online.

use crate::models::BusinessListing;

pub const WEBSITE_WEIGHT: u32 = 30;
pub const PHONE_WEIGHT: u32 = 25;
pub const ADDRESS_WEIGHT: u32 = 20;
pub const PHOTO_WEIGHT: u32 = 15;
pub const RATING_WEIGHT: u32 = 10;

const MAX_SCORE: u32 =
    WEBSITE_WEIGHT + PHONE_WEIGHT + ADDRESS_WEIGHT + PHOTO_WEIGHT + RATING_WEIGHT;

pub fn digital_score(listing: &BusinessListing) -> u8 {
    let mut score = 0;

    if listing.has_website() {
        score += WEBSITE_WEIGHT;
    }
    if listing.has_phone() {
        score += PHONE_WEIGHT;
    }
    if listing.has_address() {
        score += ADDRESS_WEIGHT;
    }
    if !listing.photos.is_empty() {
        score += PHOTO_WEIGHT;
    }
    if listing.rating.map_or(false, |r| r > 0.0) {
        score += RATING_WEIGHT;
    }

    (score as f64 / MAX_SCORE as f64 * 100.0).round() as u8
}

/// Score band driving marker colour and badge text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreBand::Excellent,
            60..=79 => ScoreBand::Good,
            40..=59 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "Excellent",
            ScoreBand::Good => "Good",
            ScoreBand::Fair => "Fair",
            ScoreBand::Poor => "Poor",
        }
    }

    /// Marker colour (green / blue / orange / red)
    pub fn color(&self) -> &'static str {
        match self {
            ScoreBand::Excellent => "#22c55e",
            ScoreBand::Good => "#3b82f6",
            ScoreBand::Fair => "#f59e0b",
            ScoreBand::Poor => "#ef4444",
        }
    }
}
