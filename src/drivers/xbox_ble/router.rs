//! Routes Bluetooth ATT notifications to the report decoder by attribute
//! handle.
use std::collections::BTreeSet;

use crate::constants::BLE_HANDLE;

use super::decoder::{DecodeError, DecodedReport, Decoder};

/// Hands payloads of the configured attribute handles to a [Decoder]
#[derive(Debug, Clone)]
pub struct AttRouter {
    handles: BTreeSet<u16>,
    decoder: Decoder,
}

impl AttRouter {
    pub fn new(decoder: Decoder, handles: impl IntoIterator<Item = u16>) -> Self {
        Self {
            handles: handles.into_iter().collect(),
            decoder,
        }
    }

    /// Returns true if payloads on the given handle are decoded
    pub fn routes(&self, handle: u16) -> bool {
        self.handles.contains(&handle)
    }

    pub fn handles(&self) -> impl Iterator<Item = u16> + '_ {
        self.handles.iter().copied()
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Decode the payload of a notification on the given handle. Returns
    /// `None` if the handle is not routed to the decoder.
    pub fn dispatch(
        &self,
        handle: u16,
        payload: &[u8],
    ) -> Option<Result<DecodedReport, DecodeError>> {
        if !self.routes(handle) {
            log::debug!("Ignoring payload on unrouted ATT handle 0x{handle:04x}");
            return None;
        }
        Some(self.decoder.decode(payload))
    }
}

impl Default for AttRouter {
    fn default() -> Self {
        Self::new(Decoder::default(), [BLE_HANDLE])
    }
}
