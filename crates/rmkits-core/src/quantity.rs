//! # Quantity Rules
//!
//! Wholesale products are sold with a minimum order, in closed packs (the
//! step, "múltiplo"), and never beyond what the stock allows. This module
//! turns whatever the customer typed into a quantity that respects all three.
//!
//! ## Two Rounding Policies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart page: normalize()              Catalog page: snap_to_nearest()   │
//! │  ─────────────────────────           ──────────────────────────────    │
//! │  aligned from the MINIMUM            aligned from ZERO                 │
//! │  always rounds UP                    rounds to NEAREST (ties up)       │
//! │  ceiling = maximum (may be           ceiling = stock floored to a      │
//! │  off-step, kept as-is)               whole pack; 0 when no pack fits   │
//! │                                                                         │
//! │  min 5, step 5: "7"  → 10            min 5, step 5: 7 → 5              │
//! │                                                                         │
//! │  The two are intentionally different. Unifying them would change      │
//! │  what the catalog selector shows.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Malformed Input
//! Nothing here fails. Text is parsed with integer-prefix semantics
//! (`"12abc"` is 12, `"7.9"` is 7); anything without a leading integer falls
//! back to the minimum.

use serde_json::Value;

// =============================================================================
// Raw Input
// =============================================================================

/// A quantity exactly as it arrived: from an input field, a stored JSON
/// value, or code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawQuantity<'a> {
    /// Text from an input field or a stringly-typed JSON value.
    Text(&'a str),
    /// An integer value.
    Integer(i64),
    /// A decimal value (truncated toward zero when parsed).
    Decimal(f64),
    /// Absent, null, or of an unusable type.
    Missing,
}

/// No upper bound. Reads better than `RawQuantity::Missing` at call sites.
pub const UNBOUNDED: RawQuantity<'static> = RawQuantity::Missing;

impl<'a> RawQuantity<'a> {
    /// Parses the raw value to an integer, or `None` if it has no leading
    /// integer.
    pub fn parse(&self) -> Option<i64> {
        match *self {
            RawQuantity::Text(s) => parse_quantity(s),
            RawQuantity::Integer(v) => Some(v),
            RawQuantity::Decimal(v) if v.is_finite() => Some(v.trunc() as i64),
            RawQuantity::Decimal(_) | RawQuantity::Missing => None,
        }
    }
}

impl<'a> From<&'a str> for RawQuantity<'a> {
    fn from(s: &'a str) -> Self {
        RawQuantity::Text(s)
    }
}

impl<'a> From<&'a String> for RawQuantity<'a> {
    fn from(s: &'a String) -> Self {
        RawQuantity::Text(s.as_str())
    }
}

impl From<i64> for RawQuantity<'_> {
    fn from(v: i64) -> Self {
        RawQuantity::Integer(v)
    }
}

impl From<i32> for RawQuantity<'_> {
    fn from(v: i32) -> Self {
        RawQuantity::Integer(i64::from(v))
    }
}

impl From<u32> for RawQuantity<'_> {
    fn from(v: u32) -> Self {
        RawQuantity::Integer(i64::from(v))
    }
}

impl From<f64> for RawQuantity<'_> {
    fn from(v: f64) -> Self {
        RawQuantity::Decimal(v)
    }
}

impl<'a, T: Into<RawQuantity<'a>>> From<Option<T>> for RawQuantity<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawQuantity::Missing, Into::into)
    }
}

impl<'a> From<&'a Value> for RawQuantity<'a> {
    fn from(v: &'a Value) -> Self {
        match v {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawQuantity::Integer(i),
                None => n.as_f64().map_or(RawQuantity::Missing, RawQuantity::Decimal),
            },
            Value::String(s) => RawQuantity::Text(s),
            _ => RawQuantity::Missing,
        }
    }
}

/// Parses the leading integer of a string.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit. Values beyond `i64` saturate.
///
/// ## Example
/// ```rust
/// use rmkits_core::quantity::parse_quantity;
///
/// assert_eq!(parse_quantity(" 12abc"), Some(12));
/// assert_eq!(parse_quantity("7.9"), Some(7));
/// assert_eq!(parse_quantity("-3"), Some(-3));
/// assert_eq!(parse_quantity(""), None);
/// assert_eq!(parse_quantity("e5"), None);
/// ```
pub fn parse_quantity(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first().copied() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        let d = i64::from(b - b'0');
        value = value.saturating_mul(10).saturating_add(d);
    }

    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

// =============================================================================
// Quantity Rules
// =============================================================================

/// Minimum, step and optional maximum for one product.
///
/// Constructors never fail: invalid parts are reset to safe defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantityRules {
    minimum: u32,
    step: u32,
    maximum: Option<u32>,
}

impl QuantityRules {
    /// Builds rules the way the cart input corrector sanitizes them.
    ///
    /// - `step = max(1, step or 1)`
    /// - `minimum = max(1, minimum or 1)`
    /// - `maximum` must be positive, otherwise unbounded
    pub fn new<'a, 'b, 'c>(
        minimum: impl Into<RawQuantity<'a>>,
        step: impl Into<RawQuantity<'b>>,
        maximum: impl Into<RawQuantity<'c>>,
    ) -> Self {
        QuantityRules {
            minimum: positive_or(parse_raw(minimum), 1),
            step: positive_or(parse_raw(step), 1),
            maximum: positive(parse_raw(maximum)),
        }
    }

    /// Builds rules for a cart line item, which additionally heals
    /// `minimum ≥ step`.
    ///
    /// ## Example
    /// ```rust
    /// use rmkits_core::quantity::{QuantityRules, UNBOUNDED};
    ///
    /// let rules = QuantityRules::for_line_item(2, 6, UNBOUNDED);
    /// assert_eq!(rules.minimum(), 6);
    /// assert_eq!(rules.step(), 6);
    /// ```
    pub fn for_line_item<'a, 'b, 'c>(
        minimum: impl Into<RawQuantity<'a>>,
        step: impl Into<RawQuantity<'b>>,
        maximum: impl Into<RawQuantity<'c>>,
    ) -> Self {
        let step = positive_or(parse_raw(step), 1);
        let minimum = positive_or(parse_raw(minimum), step).max(step);
        QuantityRules {
            minimum,
            step,
            maximum: positive(parse_raw(maximum)),
        }
    }

    /// Smallest orderable quantity.
    #[inline]
    pub const fn minimum(&self) -> u32 {
        self.minimum
    }

    /// Pack size.
    #[inline]
    pub const fn step(&self) -> u32 {
        self.step
    }

    /// Upper bound, if any.
    #[inline]
    pub const fn maximum(&self) -> Option<u32> {
        self.maximum
    }

    /// The effective upper bound (`u32::MAX` when unbounded).
    #[inline]
    pub fn ceiling(&self) -> u32 {
        self.maximum.unwrap_or(u32::MAX)
    }

    /// Corrects a raw quantity for the cart page.
    ///
    /// ## Algorithm
    /// 1. Unparseable → `minimum`
    /// 2. Below `minimum` → `minimum`
    /// 3. Above `maximum` → `maximum`
    /// 4. `step == 1` → done
    /// 5. Round UP to `minimum + k·step`; if that passes `maximum`, use
    ///    `maximum` even though it is off-step
    ///
    /// Step 5's ceiling override is deliberate: a maximum that is not
    /// reachable in whole packs still caps the quantity.
    ///
    /// ## Example
    /// ```rust
    /// use rmkits_core::quantity::QuantityRules;
    ///
    /// let rules = QuantityRules::new(5, 5, 20);
    /// assert_eq!(rules.normalize("7"), 10);
    /// assert_eq!(rules.normalize("23"), 20);
    /// assert_eq!(rules.normalize("abc"), 5);
    /// ```
    pub fn normalize<'a>(&self, raw: impl Into<RawQuantity<'a>>) -> u32 {
        let min = i64::from(self.minimum);
        let max = i64::from(self.ceiling());
        let step = i64::from(self.step);

        let Some(mut value) = parse_raw(raw) else {
            return self.minimum;
        };

        if value < min {
            value = min;
        }
        if value > max {
            value = max;
        }
        if step == 1 {
            return to_u32(value);
        }

        let k = (value - min + step - 1).div_euclid(step).max(0);
        let aligned = (min + k * step).min(max);
        to_u32(aligned)
    }

    /// One pack more, capped at the maximum (cart `+` button).
    pub fn step_up(&self, quantity: u32) -> u32 {
        quantity.saturating_add(self.step).min(self.ceiling())
    }

    /// One pack less, floored at the minimum (cart `−` button).
    pub fn step_down(&self, quantity: u32) -> u32 {
        quantity.saturating_sub(self.step).max(self.minimum)
    }
}

impl Default for QuantityRules {
    fn default() -> Self {
        QuantityRules {
            minimum: 1,
            step: 1,
            maximum: None,
        }
    }
}

/// Corrects a raw quantity against raw rules in one call.
///
/// Equivalent to `QuantityRules::new(minimum, step, maximum).normalize(raw)`.
///
/// ## Example
/// ```rust
/// use rmkits_core::quantity::{normalize, UNBOUNDED};
///
/// assert_eq!(normalize("7", 5, 5, UNBOUNDED), 10);
/// assert_eq!(normalize("3", 5, 5, UNBOUNDED), 5);
/// assert_eq!(normalize("", 5, 5, UNBOUNDED), 5);
/// assert_eq!(normalize("23", 5, 5, 20), 20);
/// ```
pub fn normalize<'a, 'b, 'c, 'd>(
    raw: impl Into<RawQuantity<'a>>,
    minimum: impl Into<RawQuantity<'b>>,
    step: impl Into<RawQuantity<'c>>,
    maximum: impl Into<RawQuantity<'d>>,
) -> u32 {
    QuantityRules::new(minimum, step, maximum).normalize(raw)
}

// =============================================================================
// Catalog Selector
// =============================================================================

/// Direction of a `+`/`−` click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepDirection {
    Increase,
    Decrease,
}

/// Largest whole-pack quantity the stock covers.
///
/// ## Example
/// ```rust
/// use rmkits_core::quantity::max_valid_by_stock;
///
/// assert_eq!(max_valid_by_stock(50, 12), 48);
/// assert_eq!(max_valid_by_stock(5, 12), 0);
/// ```
pub fn max_valid_by_stock(stock: u32, step: u32) -> u32 {
    let step = step.max(1);
    (stock / step) * step
}

/// Snaps a raw quantity for the catalog pre-add selector.
///
/// Rounds to the nearest multiple of `step` counted from zero (ties round
/// up), raises it to `minimum`, then caps it at [`max_valid_by_stock`].
/// Returns 0 when the stock does not cover a single pack.
///
/// ## Example
/// ```rust
/// use rmkits_core::quantity::snap_to_nearest;
///
/// assert_eq!(snap_to_nearest("7", 5, 5, 100), 5);
/// assert_eq!(snap_to_nearest("8", 5, 5, 100), 10);
/// assert_eq!(snap_to_nearest("500", 5, 5, 42), 40);
/// assert_eq!(snap_to_nearest("10", 5, 5, 4), 0);
/// ```
pub fn snap_to_nearest<'a>(
    raw: impl Into<RawQuantity<'a>>,
    minimum: u32,
    step: u32,
    stock: u32,
) -> u32 {
    let step = step.max(1);
    let minimum = minimum.max(1);

    let value = parse_raw(raw).unwrap_or(i64::from(minimum));
    let mut snapped = round_to_multiple(value, step);
    if snapped < i128::from(minimum) {
        snapped = i128::from(minimum);
    }

    let top = max_valid_by_stock(stock, step);
    if top == 0 {
        return 0;
    }
    u32::try_from(snapped.min(i128::from(top))).unwrap_or(top)
}

/// Moves the catalog selector one pack up or down and re-snaps it.
///
/// An unparseable current value starts from `minimum`.
pub fn catalog_adjust<'a>(
    current: impl Into<RawQuantity<'a>>,
    direction: StepDirection,
    minimum: u32,
    step: u32,
    stock: u32,
) -> u32 {
    let start = parse_raw(current).unwrap_or(i64::from(minimum));
    let delta = i64::from(step.max(1));
    let moved = match direction {
        StepDirection::Increase => start.saturating_add(delta),
        StepDirection::Decrease => start.saturating_sub(delta),
    };
    snap_to_nearest(moved, minimum, step, stock)
}

// =============================================================================
// Helpers
// =============================================================================

fn parse_raw<'a>(raw: impl Into<RawQuantity<'a>>) -> Option<i64> {
    let raw: RawQuantity<'a> = raw.into();
    raw.parse()
}

fn positive(value: Option<i64>) -> Option<u32> {
    value.filter(|v| *v > 0).map(to_u32)
}

fn positive_or(value: Option<i64>, fallback: u32) -> u32 {
    positive(value).unwrap_or(fallback)
}

fn to_u32(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

/// `floor(value / step + 0.5) * step`, in exact integer math.
fn round_to_multiple(value: i64, step: u32) -> i128 {
    let value = i128::from(value);
    let step = i128::from(step);
    (2 * value + step).div_euclid(2 * step) * step
}

// =============================================================================
// Unit Tests
// =============================================================================
