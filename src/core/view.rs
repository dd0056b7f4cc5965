//! Derived view over a raw result set: active filter, ranking sort,
//! discount filter and pagination window. Recomputed on demand; nothing here
//! is cached.

use crate::domain::model::Listing;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

pub const ITEMS_PER_PAGE: usize = 10;

/// Allowed minimum discounts to market value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum DiscountLevel {
    #[default]
    Ten,
    Twenty,
    Thirty,
    Forty,
    Fifty,
}

impl DiscountLevel {
    pub const ALL: [DiscountLevel; 5] = [
        DiscountLevel::Ten,
        DiscountLevel::Twenty,
        DiscountLevel::Thirty,
        DiscountLevel::Forty,
        DiscountLevel::Fifty,
    ];

    pub fn percent(self) -> u8 {
        match self {
            DiscountLevel::Ten => 10,
            DiscountLevel::Twenty => 20,
            DiscountLevel::Thirty => 30,
            DiscountLevel::Forty => 40,
            DiscountLevel::Fifty => 50,
        }
    }

    pub fn fraction(self) -> f64 {
        f64::from(self.percent()) / 100.0
    }

    pub fn from_percent(percent: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.percent() == percent)
    }

    /// Accepts the stored fraction form (`0.3`).
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|level| (level.fraction() - fraction).abs() < 1e-9)
    }
}

impl Serialize for DiscountLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.fraction())
    }
}

impl<'de> Deserialize<'de> for DiscountLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fraction = f64::deserialize(deserializer)?;
        Self::from_fraction(fraction).ok_or_else(|| {
            serde::de::Error::custom(format!("unsupported discount level {}", fraction))
        })
    }
}

impl std::fmt::Display for DiscountLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// Active listings ranked by investment score, best first. Ties keep their
/// input order.
pub fn rank_active(listings: &[Listing]) -> Vec<&Listing> {
    let mut active: Vec<&Listing> = listings.iter().filter(|l| l.is_active).collect();
    active.sort_by_key(|l| Reverse(l.investment_score));
    active
}

pub fn filter_by_discount<'a>(ranked: &[&'a Listing], level: DiscountLevel) -> Vec<&'a Listing> {
    let threshold = level.fraction();
    ranked
        .iter()
        .copied()
        .filter(|l| l.meets_discount(threshold))
        .collect()
}

/// User-controlled part of the view: threshold, window length and selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    discount: DiscountLevel,
    visible_count: usize,
    selected: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new(DiscountLevel::default())
    }
}

impl ViewState {
    pub fn new(discount: DiscountLevel) -> Self {
        Self {
            discount,
            visible_count: ITEMS_PER_PAGE,
            selected: None,
        }
    }

    pub fn discount(&self) -> DiscountLevel {
        self.discount
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Back to the first page with nothing expanded; used for new searches.
    pub fn reset(&mut self) {
        self.visible_count = ITEMS_PER_PAGE;
        self.selected = None;
    }

    pub fn set_discount(&mut self, discount: DiscountLevel) {
        self.discount = discount;
        self.reset();
    }

    /// Grows the window by one page while it is shorter than `filtered_len`.
    pub fn load_more(&mut self, filtered_len: usize) -> bool {
        if self.visible_count >= filtered_len {
            return false;
        }
        self.visible_count += ITEMS_PER_PAGE;
        true
    }

    /// Expands `id`, or collapses it if it is already expanded.
    pub fn toggle_selection(&mut self, id: &str) {
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        } else {
            self.selected = Some(id.to_string());
        }
    }

    pub fn derive<'a>(&self, listings: &'a [Listing]) -> DerivedView<'a> {
        let active = rank_active(listings);
        let filtered = filter_by_discount(&active, self.discount);
        DerivedView {
            active_count: active.len(),
            filtered,
            visible_count: self.visible_count,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DerivedView<'a> {
    pub active_count: usize,
    pub filtered: Vec<&'a Listing>,
    visible_count: usize,
}

impl<'a> DerivedView<'a> {
    pub fn filtered_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn visible(&self) -> &[&'a Listing] {
        let end = self.visible_count.min(self.filtered.len());
        &self.filtered[..end]
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.filtered.len()
    }
}
