//! Configuration store
//!
//! Owns the in-memory record. Every load or reset pushes the record into
//! the flow controller through its setters; a save reads the live values
//! back out first.

use tofflow_hal::Board;

use super::record::{ConfigRecord, RECORD_LEN};
use super::ConfigError;
use crate::chip::registers::ConfigRegisters;
use crate::flow::FlowController;
use crate::traits::TdcChip;

/// Offset of the record inside the board's storage region
pub const RECORD_OFFSET: u32 = 0;

/// Result of [`ConfigStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// The stored record was valid and has been applied
    Loaded,
    /// The stored record was rejected; defaults were applied and saved
    Defaults(ConfigError),
}

/// Persisted configuration
#[derive(Debug)]
pub struct ConfigStore {
    record: ConfigRecord,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore {
    pub const fn new() -> Self {
        Self {
            record: ConfigRecord::defaults(),
        }
    }

    pub fn record(&self) -> &ConfigRecord {
        &self.record
    }

    /// Register image programmed into the chip at init
    pub fn registers(&self) -> &ConfigRegisters {
        &self.record.registers
    }

    pub fn registers_mut(&mut self) -> &mut ConfigRegisters {
        &mut self.record.registers
    }

    /// Restore the stored record, falling back to defaults if it is invalid
    pub fn load(
        &mut self,
        flow: &mut FlowController,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
    ) -> LoadOutcome {
        match Self::read(board) {
            Ok(record) => {
                self.record = record;
                self.apply(flow, chip, board);
                info!("config loaded");
                LoadOutcome::Loaded
            }
            Err(e) => {
                warn!("stored config rejected: {}", e);
                if self.reset_to_defaults(flow, chip, board).is_err() {
                    warn!("saving defaults failed");
                }
                LoadOutcome::Defaults(e)
            }
        }
    }

    fn read(board: &mut dyn Board) -> Result<ConfigRecord, ConfigError> {
        let mut bytes = [0u8; RECORD_LEN];
        board.read(RECORD_OFFSET, &mut bytes)?;
        ConfigRecord::decode(&bytes, |payload| board.crc16(payload))
    }

    /// Apply and persist the factory settings
    pub fn reset_to_defaults(
        &mut self,
        flow: &mut FlowController,
        chip: &mut dyn TdcChip,
        board: &mut dyn Board,
    ) -> Result<(), ConfigError> {
        self.record = ConfigRecord::defaults();
        self.apply(flow, chip, board);
        self.save(flow, board)
    }

    /// Capture the live flow settings and write the record
    pub fn save(&mut self, flow: &FlowController, board: &mut dyn Board) -> Result<(), ConfigError> {
        self.record.mode = flow.sampling_mode();
        self.record.sos = flow.sos_method();
        self.record.frequency = flow.sampling_frequency();
        self.record.tof_temp = flow.tof_temp_ratio();
        self.record.event_timing = flow.event_timing_mode();

        let bytes = self.record.encode(|payload| board.crc16(payload));
        board.write(RECORD_OFFSET, &bytes)?;
        info!("config saved");
        Ok(())
    }

    fn apply(&self, flow: &mut FlowController, chip: &mut dyn TdcChip, board: &mut dyn Board) {
        let r = &self.record;
        flow.set_sampling_mode(r.mode, chip, board);
        flow.set_sampling_frequency(r.frequency, board);
        flow.set_sos_method(r.sos);
        flow.set_tof_temp_ratio(r.tof_temp);
        flow.set_event_timing_mode(r.event_timing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::reg;
    use crate::flow::{SamplingMode, SosMethod};
    use crate::testing::{MockBoard, MockChip};
    use crate::traits::EventTimingMode;
    use proptest::prelude::*;
    use tofflow_hal::FlashError;

    fn assert_defaults(flow: &FlowController) {
        assert_eq!(flow.sampling_mode(), SamplingMode::Idle);
        assert_eq!(flow.sos_method(), SosMethod::Direct);
        assert_eq!(flow.sampling_frequency(), 20.0);
        assert_eq!(flow.tof_temp_ratio(), 1);
        assert_eq!(flow.event_timing_mode(), EventTimingMode::Tof);
    }

    #[test]
    fn test_blank_flash_falls_back_and_persists() {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        let mut flow = FlowController::new();
        let mut store = ConfigStore::new();

        let outcome = store.load(&mut flow, &mut chip, &mut board);
        assert!(matches!(outcome, LoadOutcome::Defaults(ConfigError::Size { .. })));
        assert_defaults(&flow);
        assert_eq!(board.flash_writes, 1);

        // the re-persisted record is now valid
        let mut flow = FlowController::new();
        assert_eq!(store.load(&mut flow, &mut chip, &mut board), LoadOutcome::Loaded);
        assert_defaults(&flow);
    }

    #[test]
    fn test_save_reads_live_state() {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        let mut flow = FlowController::new();
        let mut store = ConfigStore::new();
        store.load(&mut flow, &mut chip, &mut board);

        flow.set_sos_method(SosMethod::IdealAir);
        flow.set_tof_temp_ratio(-7);
        flow.set_event_timing_mode(EventTimingMode::Temperature);
        flow.set_sampling_frequency(50.0, &mut board);
        store.registers_mut().set(reg::TOF1, 0x1234);
        store.save(&flow, &mut board).unwrap();

        let mut restored = FlowController::new();
        let mut other = ConfigStore::new();
        assert_eq!(other.load(&mut restored, &mut chip, &mut board), LoadOutcome::Loaded);
        assert_eq!(restored.sos_method(), SosMethod::IdealAir);
        assert_eq!(restored.tof_temp_ratio(), -7);
        assert_eq!(restored.event_timing_mode(), EventTimingMode::Temperature);
        assert_eq!(restored.sampling_frequency(), 50.0);
        assert_eq!(other.registers().get(reg::TOF1), Some(0x1234));
    }

    #[test]
    fn test_flash_failure_still_applies_defaults() {
        let mut chip = MockChip::new();
        let mut board = MockBoard::new();
        board.fail_flash = true;
        let mut flow = FlowController::new();
        let mut store = ConfigStore::new();
        assert_eq!(
            store.load(&mut flow, &mut chip, &mut board),
            LoadOutcome::Defaults(ConfigError::Flash(FlashError::Flash))
        );
        assert_defaults(&flow);
    }

    fn any_mode() -> impl Strategy<Value = SamplingMode> {
        prop_oneof![
            Just(SamplingMode::Idle),
            Just(SamplingMode::Event),
            Just(SamplingMode::Host),
            Just(SamplingMode::Max),
        ]
    }

    fn any_event_timing() -> impl Strategy<Value = EventTimingMode> {
        prop_oneof![
            Just(EventTimingMode::Tof),
            Just(EventTimingMode::Temperature),
            Just(EventTimingMode::TofTemperature),
        ]
    }

    proptest! {
        #[test]
        fn test_save_load_round_trip(
            mode in any_mode(),
            ideal_air in any::<bool>(),
            hz in 0.1f32..1000.0,
            ratio in any::<i16>(),
            event in any_event_timing(),
        ) {
            let mut chip = MockChip::new();
            let mut board = MockBoard::new();
            let mut flow = FlowController::new();
            let mut store = ConfigStore::new();
            let sos = if ideal_air { SosMethod::IdealAir } else { SosMethod::Direct };

            flow.set_sampling_mode(mode, &mut chip, &mut board);
            flow.set_sos_method(sos);
            flow.set_sampling_frequency(hz, &mut board);
            flow.set_tof_temp_ratio(ratio);
            flow.set_event_timing_mode(event);
            store.save(&flow, &mut board).unwrap();

            let mut restored = FlowController::new();
            let outcome = ConfigStore::new().load(&mut restored, &mut chip, &mut board);
            prop_assert_eq!(outcome, LoadOutcome::Loaded);
            prop_assert_eq!(restored.sampling_mode(), mode);
            prop_assert_eq!(restored.sos_method(), sos);
            prop_assert_eq!(restored.sampling_frequency().to_bits(), hz.to_bits());
            prop_assert_eq!(restored.tof_temp_ratio(), ratio);
            prop_assert_eq!(restored.event_timing_mode(), event);
        }

        #[test]
        fn test_corruption_falls_back(index in 0usize..RECORD_LEN, flip in 1u8..=255) {
            let mut chip = MockChip::new();
            let mut board = MockBoard::new();
            let mut flow = FlowController::new();
            let mut store = ConfigStore::new();
            flow.set_tof_temp_ratio(9);
            flow.set_sampling_frequency(123.0, &mut board);
            store.save(&flow, &mut board).unwrap();

            board.flash[index] ^= flip;
            let mut restored = FlowController::new();
            let mut other = ConfigStore::new();
            let outcome = other.load(&mut restored, &mut chip, &mut board);
            prop_assert!(matches!(outcome, LoadOutcome::Defaults(_)));
            assert_defaults(&restored);

            // and a valid record is back in storage
            let mut again = FlowController::new();
            prop_assert_eq!(ConfigStore::new().load(&mut again, &mut chip, &mut board), LoadOutcome::Loaded);
        }
    }
}
