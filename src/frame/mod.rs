//! In-memory representation of a classic CAN frame as exchanged with every
//! backend, plus the validation rules adapters apply before transmitting.
use embedded_can::{ExtendedId, Id, StandardId};

/// Maximum payload of a classic CAN frame.
pub const MAX_DATA_LEN: usize = 8;
/// Largest identifier representable in the 11-bit standard format.
pub const MAX_STANDARD_ID: u32 = 0x7FF;
/// Largest identifier representable in the 29-bit extended format.
pub const MAX_EXTENDED_ID: u32 = 0x1FFF_FFFF;

//==================================================================================FRAME
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw CAN frame as written to or read from a transceiver.
pub struct Frame {
    /// Identifier: 11 significant bits when standard, 29 when extended.
    pub id: u32,
    /// `true` for the 29-bit extended format.
    pub extended: bool,
    /// Remote transmission request.
    pub remote: bool,
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: u8,
    /// Payload buffer. Only the first `len` bytes are meaningful.
    pub data: [u8; MAX_DATA_LEN],
}

impl Frame {
    /// Builds a standard (11-bit) data frame. `None` if the payload exceeds eight bytes.
    pub fn new_standard(id: u16, payload: &[u8]) -> Option<Self> {
        Self::with_payload(id as u32, false, payload)
    }

    /// Builds an extended (29-bit) data frame. `None` if the payload exceeds eight bytes.
    pub fn new_extended(id: u32, payload: &[u8]) -> Option<Self> {
        Self::with_payload(id, true, payload)
    }

    /// Builds a remote frame requesting `dlc` bytes.
    pub fn new_remote(id: u32, extended: bool, dlc: u8) -> Option<Self> {
        let frame = Self {
            id,
            extended,
            remote: true,
            len: dlc,
            data: [0; MAX_DATA_LEN],
        };
        frame.validate().then_some(frame)
    }

    fn with_payload(id: u32, extended: bool, payload: &[u8]) -> Option<Self> {
        if payload.len() > MAX_DATA_LEN {
            return None;
        }
        let mut data = [0u8; MAX_DATA_LEN];
        data[..payload.len()].copy_from_slice(payload);
        let frame = Self {
            id,
            extended,
            remote: false,
            len: payload.len() as u8,
            data,
        };
        frame.validate().then_some(frame)
    }

    /// Checks the length and identifier range invariants.
    ///
    /// - `len` must not exceed [`MAX_DATA_LEN`]
    /// - a standard frame must carry an identifier ≤ [`MAX_STANDARD_ID`]
    /// - an extended frame must carry an identifier ≤ [`MAX_EXTENDED_ID`]
    pub fn validate(&self) -> bool {
        let max_id = if self.extended {
            MAX_EXTENDED_ID
        } else {
            MAX_STANDARD_ID
        };
        (self.len as usize) <= MAX_DATA_LEN && self.id <= max_id
    }

    /// Meaningful payload bytes, clamped to the buffer size.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        let len = (self.len as usize).min(MAX_DATA_LEN);
        &self.data[..len]
    }
}

//==================================================================================EMBEDDED_CAN
impl embedded_can::Frame for Frame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        match id.into() {
            Id::Standard(std_id) => Self::new_standard(std_id.as_raw(), data),
            Id::Extended(ext_id) => Self::new_extended(ext_id.as_raw(), data),
        }
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_DATA_LEN {
            return None;
        }
        match id.into() {
            Id::Standard(std_id) => Frame::new_remote(std_id.as_raw() as u32, false, dlc as u8),
            Id::Extended(ext_id) => Frame::new_remote(ext_id.as_raw(), true, dlc as u8),
        }
    }

    fn is_extended(&self) -> bool {
        self.extended
    }

    fn is_remote_frame(&self) -> bool {
        self.remote
    }

    fn id(&self) -> Id {
        // Out-of-range identifiers are masked; `validate` is what rejects them.
        if self.extended {
            Id::Extended(ExtendedId::new(self.id & MAX_EXTENDED_ID).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(
                StandardId::new((self.id & MAX_STANDARD_ID) as u16).unwrap_or(StandardId::ZERO),
            )
        }
    }

    fn dlc(&self) -> usize {
        self.len as usize
    }

    fn data(&self) -> &[u8] {
        if self.remote {
            &[]
        } else {
            self.payload()
        }
    }
}
