//! Specialized interpretation of a building's parameter tail for the two
//! logistics station item ids. Grounded on the original `StationParameters`
//! class in `original_source/BlueprintData.py`; the cell ranges and strides
//! below are transcribed from its `_STORAGE_OFFSET`/`_SLOTS_OFFSET`/
//! `_PARAMETERS_OFFSET` constants and `_parse_storage`/`_parse_slots`/
//! `_parse_parameters` methods.
use serde::Serialize;

/// Item id of the planetary logistics station (`storage_len = 3`).
pub const PLANETARY_LOGISTICS_STATION: u16 = 2103;
/// Item id of the interstellar logistics station (`storage_len = 5`).
pub const INTERSTELLAR_LOGISTICS_STATION: u16 = 2104;
/// Every logistics station exposes 12 slots regardless of storage length.
pub const SLOTS_LEN: usize = 12;

const STORAGE_OFFSET: usize = 0;
const SLOTS_OFFSET: usize = STORAGE_OFFSET + 192;
const PARAMETERS_OFFSET: usize = SLOTS_OFFSET + 128;

/// Which way goods flow through a station slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LogisticsDirection {
    Output = 1,
    Input = 2,
}

impl LogisticsDirection {
    fn from_u32(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(LogisticsDirection::Output),
            2 => Some(LogisticsDirection::Input),
            _ => None,
        }
    }
}

/// One storage slot inside a logistics station; `None` when the entry is
/// unused (item id cell is zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StorageEntry {
    pub item_id: u32,
    pub local_logic: u32,
    pub remote_logic: u32,
    pub max_count: u32,
}

/// One delivery slot inside a logistics station; `None` when unused
/// (storage index cell is zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotEntry {
    pub direction: Option<LogisticsDirection>,
    pub storage_index: u32,
}

/// The eight scalar station-wide parameters found at cell range `[320..328)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StationParameters {
    pub work_energy: u32,
    pub drone_range: u32,
    pub vessel_range: u32,
    pub orbital_collector: bool,
    pub warp_distance: u32,
    pub equip_warper: bool,
    pub drone_count: u32,
    pub vessel_count: u32,
}

/// A read-only interpretation of a station building's raw parameter cells.
///
/// Derived on demand from the raw `Vec<u32>`; there is no API to write
/// through this view back into the raw buffer (see `SPEC_FULL.md` §9, open
/// question 1) — mutate `Building::parameters` directly instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationView {
    pub storage: Vec<Option<StorageEntry>>,
    pub slots: Vec<Option<SlotEntry>>,
    pub parameters: StationParameters,
}

impl StationView {
    /// Interpret `raw` as a station's parameter cells, given the item's
    /// storage length (3 for planetary, 5 for interstellar stations).
    ///
    /// Cells outside `raw`'s bounds read as zero, matching the Python
    /// source's behavior of indexing a list that the game always pads to
    /// at least 328 cells for these two item ids.
    pub fn parse(raw: &[u32], storage_len: usize) -> Self {
        let cell = |index: usize| -> u32 { raw.get(index).copied().unwrap_or(0) };

        let mut storage = Vec::with_capacity(storage_len);
        for i in 0..storage_len {
            let offset = STORAGE_OFFSET + 6 * i;
            let item_id = cell(offset);
            storage.push(if item_id == 0 {
                None
            } else {
                Some(StorageEntry {
                    item_id,
                    local_logic: cell(offset + 1),
                    remote_logic: cell(offset + 2),
                    max_count: cell(offset + 3),
                })
            });
        }

        let mut slots = Vec::with_capacity(SLOTS_LEN);
        for i in 0..SLOTS_LEN {
            let offset = SLOTS_OFFSET + 4 * i;
            let storage_index = cell(offset + 1);
            slots.push(if storage_index == 0 {
                None
            } else {
                Some(SlotEntry {
                    direction: LogisticsDirection::from_u32(cell(offset)),
                    storage_index,
                })
            });
        }

        let parameters = StationParameters {
            work_energy: cell(PARAMETERS_OFFSET),
            drone_range: cell(PARAMETERS_OFFSET + 1),
            vessel_range: cell(PARAMETERS_OFFSET + 2),
            orbital_collector: cell(PARAMETERS_OFFSET + 3) == 1,
            warp_distance: cell(PARAMETERS_OFFSET + 4),
            equip_warper: cell(PARAMETERS_OFFSET + 5) == 1,
            drone_count: cell(PARAMETERS_OFFSET + 6),
            vessel_count: cell(PARAMETERS_OFFSET + 7),
        };

        Self { storage, slots, parameters }
    }

    /// Storage length implied by `item_id`, if it names a logistics
    /// station.
    pub fn storage_len_for(item_id: u16) -> Option<usize> {
        match item_id {
            PLANETARY_LOGISTICS_STATION => Some(3),
            INTERSTELLAR_LOGISTICS_STATION => Some(5),
            _ => None,
        }
    }
}
