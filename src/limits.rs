//! Hard caps on request input.

pub const MAX_USER_LEN: usize = 256;
pub const MAX_RESOURCE_ID_LEN: usize = 128;

/// One calendar day. Longer bookings would be multi-day, which is not supported.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;
