//! Parameter introspection for hosts, presets and control surfaces.
//!
//! Processors expose their controls through the [`ParameterInfo`] trait:
//! index-based access plus a [`ParamDescriptor`] per parameter carrying the
//! range, unit, stable [`ParamId`], and (for switches and selectors) the
//! labels of each step.
//!
//! Implementations are usually generated with [`impl_params!`](crate::impl_params),
//! which keeps descriptor, getter and setter of a parameter on adjacent lines.
//!
//! # Example
//!
//! ```rust
//! use squeeze_core::{ParameterInfo, ParamDescriptor, ParamId};
//!
//! struct Trim {
//!     gain_db: f64,
//! }
//!
//! squeeze_core::impl_params! {
//!     Trim, this {
//!         [0] ParamDescriptor::gain_db("Gain", "Gain", -24.0, 24.0, 0.0)
//!                 .with_id(ParamId(1), "trim_gain"),
//!             get: this.gain_db,
//!             set: |v| this.gain_db = v.clamp(-24.0, 24.0);
//!     }
//! }
//!
//! let mut trim = Trim { gain_db: 0.0 };
//! trim.set_param(0, 40.0);
//! assert_eq!(trim.get_param(0), 24.0);
//! assert_eq!(trim.find_param_by_name("gain"), Some(0));
//! ```

/// Scaling curve for parameter normalization.
///
/// - **Linear**: `normalized = (value - min) / (max - min)`
/// - **Logarithmic**: `normalized = ln(value/min) / ln(max/min)` (requires `min > 0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// More resolution at low values; meant for frequencies.
    Logarithmic,
}

/// Stable parameter identifier that survives reordering.
///
/// Once assigned, a `ParamId` must never change for a given parameter:
/// presets and host automation refer to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability flags.
///
/// ```rust
/// use squeeze_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::AUTOMATABLE.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Host can automate this parameter (default for all params).
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Parameter has discrete steps (switches, selectors).
    pub const STEPPED: Self = Self(1 << 1);

    /// Returns `true` if all bits in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Trait for processors that expose introspectable parameters.
///
/// Parameters are accessed by zero-based index, stable for the lifetime of
/// the instance. Setters clamp to the descriptor range; out-of-bounds indices
/// are ignored by setters and read back as `0.0`.
pub trait ParameterInfo {
    /// Returns the number of parameters; valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Returns the descriptor for the parameter at `index`, or `None` when
    /// `index >= param_count()`.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Gets the current value of the parameter at `index`.
    fn get_param(&self, index: usize) -> f64;

    /// Sets the parameter at `index`; the value is clamped to its range and
    /// `NaN` falls back to the default.
    fn set_param(&mut self, index: usize, value: f64);

    /// Find a parameter index by name (case-insensitive).
    ///
    /// Matches [`ParamDescriptor::name`], [`ParamDescriptor::short_name`]
    /// and [`ParamDescriptor::string_id`].
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|desc| {
                desc.name.eq_ignore_ascii_case(name)
                    || desc.short_name.eq_ignore_ascii_case(name)
                    || desc.string_id.eq_ignore_ascii_case(name)
            })
        })
    }

    /// Returns the stable [`ParamId`] for the parameter at `index`.
    fn param_id(&self, index: usize) -> Option<ParamId> {
        self.param_info(index).map(|d| d.id)
    }

    /// Finds a parameter index by its stable [`ParamId`].
    ///
    /// Scans all parameters (O(n)), meant for setup paths.
    fn param_index_by_id(&self, id: ParamId) -> Option<usize> {
        (0..self.param_count()).find(|&i| self.param_info(i).is_some_and(|d| d.id == id))
    }
}

/// Describes a single parameter's metadata for display and validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full parameter name for display (e.g., "Threshold").
    pub name: &'static str,
    /// Short name for narrow displays, max 8 characters.
    pub short_name: &'static str,
    /// Unit type for formatting the parameter value.
    pub unit: ParamUnit,
    /// Minimum allowed value.
    pub min: f64,
    /// Maximum allowed value.
    pub max: f64,
    /// Value after construction.
    pub default: f64,
    /// Recommended step increment.
    pub step: f64,
    /// Stable numeric ID. Default: `ParamId(0)` (unassigned).
    pub id: ParamId,
    /// Human-readable stable ID, `"group_param"` convention (e.g. `"comp_ratio"`).
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Labels for each step of a stepped parameter, indexed from `min`.
    pub step_labels: &'static [&'static str],
}

impl ParamDescriptor {
    /// Generic continuous parameter without a unit.
    pub const fn custom(
        name: &'static str,
        short_name: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            min,
            max,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            step_labels: &[],
        }
    }

    /// Standard mix parameter (0–100%, default 50%).
    pub const fn mix() -> Self {
        Self {
            unit: ParamUnit::Percent,
            step: 1.0,
            ..Self::custom("Mix", "Mix", 0.0, 100.0, 50.0)
        }
    }

    /// Time parameter with custom name and range (milliseconds).
    pub const fn time_ms(
        name: &'static str,
        short_name: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            unit: ParamUnit::Milliseconds,
            step: 1.0,
            ..Self::custom(name, short_name, min, max, default)
        }
    }

    /// Gain parameter with custom name and range (decibels).
    pub const fn gain_db(
        name: &'static str,
        short_name: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            unit: ParamUnit::Decibels,
            step: 0.5,
            ..Self::custom(name, short_name, min, max, default)
        }
    }

    /// Frequency parameter in Hz with logarithmic scaling.
    pub const fn frequency_hz(
        name: &'static str,
        short_name: &'static str,
        min: f64,
        max: f64,
        default: f64,
    ) -> Self {
        Self {
            unit: ParamUnit::Hertz,
            step: 1.0,
            scale: ParamScale::Logarithmic,
            ..Self::custom(name, short_name, min, max, default)
        }
    }

    /// Two-state switch (`0.0` = off, `1.0` = on).
    pub const fn toggle(name: &'static str, short_name: &'static str, default: bool) -> Self {
        Self {
            step: 1.0,
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            step_labels: &["Off", "On"],
            ..Self::custom(name, short_name, 0.0, 1.0, if default { 1.0 } else { 0.0 })
        }
    }

    /// Selector over `labels.len()` choices, values `0..labels.len()`.
    pub const fn choice(
        name: &'static str,
        short_name: &'static str,
        labels: &'static [&'static str],
        default: usize,
    ) -> Self {
        Self {
            step: 1.0,
            flags: ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED),
            step_labels: labels,
            ..Self::custom(
                name,
                short_name,
                0.0,
                (labels.len() - 1) as f64,
                default as f64,
            )
        }
    }

    /// Sets the stable parameter ID and string ID.
    ///
    /// ```rust
    /// use squeeze_core::{ParamDescriptor, ParamId};
    ///
    /// let desc = ParamDescriptor::mix().with_id(ParamId(700), "comp_mix");
    /// assert_eq!(desc.id, ParamId(700));
    /// assert_eq!(desc.string_id, "comp_mix");
    /// ```
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Clamps a value to this parameter's valid range.
    ///
    /// `NaN` maps to the default.
    ///
    /// ```rust
    /// use squeeze_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::gain_db("Gain", "Gain", -60.0, 12.0, 0.0);
    /// assert_eq!(desc.clamp(-100.0), -60.0);
    /// assert_eq!(desc.clamp(100.0), 12.0);
    /// assert_eq!(desc.clamp(f64::NAN), 0.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Returns `true` for switches and selectors.
    pub fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Label of the step nearest to `value`, for stepped parameters.
    pub fn step_label(&self, value: f64) -> Option<&'static str> {
        if self.step_labels.is_empty() {
            return None;
        }
        let index = libm::round(self.clamp(value) - self.min) as usize;
        self.step_labels.get(index).copied()
    }

    /// Value of the step with the given label (case-insensitive).
    pub fn value_for_label(&self, label: &str) -> Option<f64> {
        self.step_labels
            .iter()
            .position(|l| l.eq_ignore_ascii_case(label))
            .map(|i| self.min + i as f64)
    }

    /// Converts a plain value to the `0.0..=1.0` range, respecting [`ParamScale`].
    ///
    /// ```rust
    /// use squeeze_core::ParamDescriptor;
    ///
    /// let desc = ParamDescriptor::mix();
    /// assert_eq!(desc.normalize(50.0), 0.5);
    /// ```
    #[inline]
    pub fn normalize(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 || value <= 0.0 {
                    return 0.0;
                }
                libm::log(value / self.min) / libm::log(self.max / self.min)
            }
        }
    }

    /// Inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, normalized: f64) -> f64 {
        match self.scale {
            ParamScale::Linear => self.min + normalized * (self.max - self.min),
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return self.min;
                }
                self.min * libm::pow(self.max / self.min, normalized)
            }
        }
    }
}

/// Unit type for parameter display and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB).
    Decibels,
    /// Hertz (Hz).
    Hertz,
    /// Milliseconds (ms).
    Milliseconds,
    /// Percentage (%).
    Percent,
    /// Ratio (n:1).
    Ratio,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// ```rust
    /// use squeeze_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Ratio.suffix(), ":1");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Ratio => ":1",
            ParamUnit::None => "",
        }
    }
}

/// Implements [`ParameterInfo`] from a table of descriptor/getter/setter rows.
///
/// ```text
/// impl_params! {
///     Type, this {
///         [index] descriptor,
///             get: expression reading `this`,
///             set: |v| statement writing through `this`;
///     }
/// }
/// ```
#[macro_export]
macro_rules! impl_params {
    (
        $ty:ty, $this:ident {
            $( [$idx:literal] $desc:expr,
                get: $get:expr,
                set: |$v:ident| $set:expr; )*
        }
    ) => {
        impl $crate::ParameterInfo for $ty {
            fn param_count(&self) -> usize {
                [$($idx),*].len()
            }

            fn param_info(&self, index: usize) -> Option<$crate::ParamDescriptor> {
                match index {
                    $( $idx => Some($desc), )*
                    _ => None,
                }
            }

            fn get_param(&self, index: usize) -> f64 {
                let $this = self;
                match index {
                    $( $idx => $get, )*
                    _ => 0.0,
                }
            }

            fn set_param(&mut self, index: usize, value: f64) {
                let $this = self;
                match index {
                    $( $idx => {
                        let $v = $crate::ParamDescriptor::clamp(&$desc, value);
                        $set;
                    } )*
                    _ => {}
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "std"))]
    extern crate alloc;
    #[cfg(not(feature = "std"))]
    use alloc::format;

    struct TestProcessor {
        gain: f64,
        mode: usize,
        enabled: bool,
    }

    crate::impl_params! {
        TestProcessor, this {
            [0] ParamDescriptor::gain_db("Gain", "Gain", -60.0, 12.0, 0.0)
                    .with_id(ParamId(100), "test_gain"),
                get: this.gain,
                set: |v| this.gain = v.clamp(-60.0, 12.0);

            [1] ParamDescriptor::choice("Mode", "Mode", &["Peak", "RMS", "Both"], 0)
                    .with_id(ParamId(101), "test_mode"),
                get: this.mode as f64,
                set: |v| this.mode = libm::round(v.clamp(0.0, 2.0)) as usize;

            [2] ParamDescriptor::toggle("Enabled", "On", true)
                    .with_id(ParamId(102), "test_on"),
                get: if this.enabled { 1.0 } else { 0.0 },
                set: |v| this.enabled = v >= 0.5;
        }
    }

    fn processor() -> TestProcessor {
        TestProcessor {
            gain: 0.0,
            mode: 0,
            enabled: true,
        }
    }

    #[test]
    fn test_param_count_and_info() {
        let p = processor();
        assert_eq!(p.param_count(), 3);
        let gain = p.param_info(0).expect("gain descriptor");
        assert_eq!(gain.unit, ParamUnit::Decibels);
        assert_eq!(gain.min, -60.0);
        assert!(p.param_info(3).is_none());
    }

    #[test]
    fn test_get_set_and_clamp() {
        let mut p = processor();
        p.set_param(0, 6.0);
        assert_eq!(p.get_param(0), 6.0);
        p.set_param(0, 100.0);
        assert_eq!(p.get_param(0), 12.0);
        p.set_param(1, 1.4);
        assert_eq!(p.get_param(1), 1.0);
        p.set_param(2, 0.0);
        assert_eq!(p.get_param(2), 0.0);
    }

    #[test]
    fn test_set_param_nan_restores_default() {
        let mut p = processor();
        p.set_param(0, 6.0);
        p.set_param(0, f64::NAN);
        assert_eq!(p.get_param(0), 0.0);
        p.set_param(1, f64::NAN);
        assert_eq!(p.get_param(1), 0.0);
        p.set_param(2, f64::NAN);
        assert_eq!(p.get_param(2), 1.0);
    }

    #[test]
    fn test_out_of_bounds_index() {
        let mut p = processor();
        assert_eq!(p.get_param(99), 0.0);
        p.set_param(99, 42.0);
        assert_eq!(p.get_param(0), 0.0);
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let p = processor();
        assert_eq!(p.find_param_by_name("GAIN"), Some(0));
        assert_eq!(p.find_param_by_name("test_mode"), Some(1));
        assert_eq!(p.find_param_by_name("on"), Some(2));
        assert_eq!(p.find_param_by_name("missing"), None);
        assert_eq!(p.param_index_by_id(ParamId(102)), Some(2));
        assert_eq!(p.param_id(1), Some(ParamId(101)));
    }

    #[test]
    fn test_step_labels() {
        let desc = ParamDescriptor::choice("Mode", "Mode", &["Peak", "RMS", "Both"], 1);
        assert!(desc.is_stepped());
        assert_eq!(desc.max, 2.0);
        assert_eq!(desc.default, 1.0);
        assert_eq!(desc.step_label(1.2), Some("RMS"));
        assert_eq!(desc.step_label(9.0), Some("Both"));
        assert_eq!(desc.value_for_label("rms"), Some(1.0));
        assert_eq!(desc.value_for_label("nope"), None);

        let plain = ParamDescriptor::mix();
        assert_eq!(plain.step_label(50.0), None);
    }

    #[test]
    fn test_normalize_denormalize_logarithmic() {
        let desc = ParamDescriptor::frequency_hz("Cutoff", "Cutoff", 20.0, 20000.0, 1000.0);
        assert!(desc.normalize(20.0).abs() < 1e-12);
        assert!((desc.normalize(20000.0) - 1.0).abs() < 1e-12);
        let mid = desc.denormalize(0.5);
        assert!((mid - libm::sqrt(20.0 * 20000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_zero_range() {
        let desc = ParamDescriptor::gain_db("Fixed", "Fixed", 42.0, 42.0, 42.0);
        assert_eq!(desc.normalize(42.0), 0.0);
    }

    #[test]
    fn test_descriptor_debug() {
        let _ = format!("{:?}", ParamDescriptor::toggle("Bypass", "Bypass", false));
    }
}
