//! Lock-free parameter and meter exchange between a control thread and the
//! audio thread.
//!
//! Values are `f64` bit-cast into `AtomicU64`. The control thread writes
//! parameters and reads meters; the audio thread applies changed parameters
//! once per block and publishes meters at the end of it. Each value is
//! individually consistent; a block may observe a mix of old and new values.
//!
//! ```rust
//! use std::sync::Arc;
//! use squeeze_dynamics::{Compressor, SharedMeters, SharedParams};
//!
//! let mut comp = Compressor::new(2, 48000.0);
//! let params = Arc::new(SharedParams::new(&comp));
//! let meters = Arc::new(SharedMeters::new(comp.channels()));
//!
//! // control thread
//! let ratio = params.index_of("ratio").unwrap();
//! params.set(ratio, 8.0);
//!
//! // audio thread, once per block
//! comp.sync_from(&params);
//! let mut left = [0.25; 64];
//! let mut right = [0.25; 64];
//! comp.process(&mut [&mut left[..], &mut right[..]], None);
//! comp.publish_meters(&meters);
//!
//! assert_eq!(comp.ratio(), 8.0);
//! assert!(meters.snapshot(0).unwrap().input_peak_db > -13.0);
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;
#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use squeeze_core::{ParamDescriptor, ParameterInfo};

use crate::compressor::Compressor;
use crate::meter::MeterSnapshot;

/// One parameter slot.
#[derive(Debug)]
struct ParamSlot {
    value: AtomicU64,
    changed: AtomicBool,
    descriptor: ParamDescriptor,
}

/// Parameter values shared with the audio thread.
///
/// Indices follow the [`ParameterInfo`] order of the processor it was built
/// from.
#[derive(Debug)]
pub struct SharedParams {
    slots: Box<[ParamSlot]>,
}

impl SharedParams {
    /// Captures the descriptors and current values of `processor`.
    pub fn new(processor: &impl ParameterInfo) -> Self {
        let slots: Vec<ParamSlot> = (0..processor.param_count())
            .filter_map(|i| {
                processor.param_info(i).map(|descriptor| ParamSlot {
                    value: AtomicU64::new(processor.get_param(i).to_bits()),
                    changed: AtomicBool::new(false),
                    descriptor,
                })
            })
            .collect();
        Self {
            slots: slots.into_boxed_slice(),
        }
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Descriptor of parameter `index`.
    pub fn descriptor(&self, index: usize) -> Option<&ParamDescriptor> {
        self.slots.get(index).map(|s| &s.descriptor)
    }

    /// Index of the parameter called `name` (name, short name or string ID,
    /// case-insensitive).
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|s| {
            s.descriptor.name.eq_ignore_ascii_case(name)
                || s.descriptor.short_name.eq_ignore_ascii_case(name)
                || s.descriptor.string_id.eq_ignore_ascii_case(name)
        })
    }

    /// Current value of parameter `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.slots
            .get(index)
            .map(|s| f64::from_bits(s.value.load(Ordering::Acquire)))
    }

    /// Stores a value (clamped to the descriptor range) and marks it changed.
    ///
    /// Out-of-range indices are ignored.
    pub fn set(&self, index: usize, value: f64) {
        if let Some(slot) = self.slots.get(index) {
            let clamped = slot.descriptor.clamp(value);
            slot.value.store(clamped.to_bits(), Ordering::Release);
            slot.changed.store(true, Ordering::Release);
        }
    }

    /// Calls `apply` for every value changed since the last drain.
    pub fn drain_changes(&self, mut apply: impl FnMut(usize, f64)) {
        for (index, slot) in self.slots.iter().enumerate() {
            if slot.changed.swap(false, Ordering::AcqRel) {
                apply(index, f64::from_bits(slot.value.load(Ordering::Acquire)));
            }
        }
    }
}

const METER_FIELDS: usize = 10;

/// Meter values published by the audio thread.
#[derive(Debug)]
pub struct SharedMeters {
    channels: Box<[[AtomicU64; METER_FIELDS]]>,
}

impl SharedMeters {
    /// Creates storage for `channels` channels, reading silence.
    pub fn new(channels: usize) -> Self {
        let channels: Vec<[AtomicU64; METER_FIELDS]> = (0..channels)
            .map(|_| {
                let fields = to_fields(&MeterSnapshot::default());
                fields.map(|v| AtomicU64::new(v.to_bits()))
            })
            .collect();
        Self {
            channels: channels.into_boxed_slice(),
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    /// Stores the meters of `channel`; out-of-range channels are ignored.
    pub fn store(&self, channel: usize, snapshot: &MeterSnapshot) {
        if let Some(cells) = self.channels.get(channel) {
            for (cell, value) in cells.iter().zip(to_fields(snapshot)) {
                cell.store(value.to_bits(), Ordering::Relaxed);
            }
        }
    }

    /// Last published meters of `channel`.
    pub fn snapshot(&self, channel: usize) -> Option<MeterSnapshot> {
        self.channels.get(channel).map(|cells| {
            let fields = cells.each_ref().map(|c| f64::from_bits(c.load(Ordering::Relaxed)));
            from_fields(fields)
        })
    }
}

fn to_fields(s: &MeterSnapshot) -> [f64; METER_FIELDS] {
    [
        s.input_peak_db,
        s.input_peak_hold_db,
        s.input_max_db,
        s.input_average_db,
        s.output_peak_db,
        s.output_peak_hold_db,
        s.output_max_db,
        s.output_average_db,
        s.gain_reduction_db,
        s.gain_reduction_peak_db,
    ]
}

fn from_fields(f: [f64; METER_FIELDS]) -> MeterSnapshot {
    MeterSnapshot {
        input_peak_db: f[0],
        input_peak_hold_db: f[1],
        input_max_db: f[2],
        input_average_db: f[3],
        output_peak_db: f[4],
        output_peak_hold_db: f[5],
        output_max_db: f[6],
        output_average_db: f[7],
        gain_reduction_db: f[8],
        gain_reduction_peak_db: f[9],
    }
}

impl Compressor {
    /// Applies every parameter changed in `shared` since the last call.
    ///
    /// Meant to be called by the audio thread once per block.
    pub fn sync_from(&mut self, shared: &SharedParams) {
        shared.drain_changes(|index, value| self.set_param(index, value));
    }

    /// Publishes the meters of every channel to `shared`.
    pub fn publish_meters(&self, shared: &SharedMeters) {
        for channel in 0..self.channels().min(shared.channels()) {
            shared.store(channel, &self.meter_snapshot(channel));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_start_from_processor_values() {
        let mut comp = Compressor::new(1, 48000.0);
        comp.set_threshold_db(-30.0);
        let shared = SharedParams::new(&comp);
        assert_eq!(shared.len(), comp.param_count());
        let index = shared.index_of("comp_thresh").expect("threshold");
        assert_eq!(shared.get(index), Some(-30.0));
    }

    #[test]
    fn test_set_clamps_to_descriptor() {
        let comp = Compressor::new(1, 48000.0);
        let shared = SharedParams::new(&comp);
        let ratio = shared.index_of("Ratio").expect("ratio");
        shared.set(ratio, 100.0);
        assert_eq!(shared.get(ratio), Some(20.0));
        shared.set(999, 1.0);
        assert_eq!(shared.get(999), None);
    }

    #[test]
    fn test_sync_applies_only_changes() {
        let mut comp = Compressor::new(1, 48000.0);
        let shared = SharedParams::new(&comp);
        let ratio = shared.index_of("ratio").expect("ratio");
        let attack = shared.index_of("attack").expect("attack");

        shared.set(ratio, 6.0);
        // a direct change that the bridge does not know about survives sync
        comp.set_attack_ms(42.0);
        comp.sync_from(&shared);
        assert_eq!(comp.ratio(), 6.0);
        assert_eq!(comp.attack_ms(), 42.0);

        let mut count = 0;
        shared.drain_changes(|_, _| count += 1);
        assert_eq!(count, 0);
        assert_eq!(shared.get(attack), Some(10.0));
    }

    #[test]
    fn test_meters_round_trip_through_atomics() {
        let mut comp = Compressor::new(2, 48000.0);
        let shared = SharedMeters::new(2);
        assert_eq!(shared.snapshot(0), Some(MeterSnapshot::default()));

        let mut left = [0.5; 256];
        let mut right = [0.1; 256];
        comp.process(&mut [&mut left[..], &mut right[..]], None);
        comp.publish_meters(&shared);

        assert_eq!(shared.snapshot(1), Some(comp.meter_snapshot(1)));
        assert_eq!(shared.snapshot(2), None);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_bridge_across_threads() {
        use std::sync::Arc;
        use std::thread;

        let comp = Compressor::new(1, 48000.0);
        let shared = Arc::new(SharedParams::new(&comp));
        let writer = Arc::clone(&shared);
        let threshold = shared.index_of("threshold").expect("threshold");

        thread::spawn(move || writer.set(threshold, -24.0))
            .join()
            .expect("writer thread");

        let mut comp = comp;
        comp.sync_from(&shared);
        assert_eq!(comp.threshold_db(), -24.0);
    }
}
