//! A Rust wrapper for Plexon's `PlexClient` MAP client library.
//!
//! `PlexClient` connects to a running MAP Server over memory-mapped
//! files. The library keeps its connection as process-global state, so
//! the functions here are free functions rather than methods on a handle.
//! Buffers are always owned by the caller and passed in by pointer; the
//! library fills them in place and reports how much of each was written:
//!
//! ```text
//! Owned by the Server:        Owned by the caller:          Application logic:
//! +----------------+          +------------------+          +------------------+
//! | MMF event      |   Copy   | [PL_WaveLong;    |   Copy   | [Sort, bucket]   |
//! | queues         | =======> |  capacity]       | =======> | [Display]        |
//! |                |    ^     |                  |    ^     | [Etc.]           |
//! +----------------+    |     +------------------+    |     +------------------+
//!                       |                             |
//!         Done by PlexClient during              Necessary because the
//!         PL_GetLongWaveFormStructuresEx2        caller's buffer is
//!                                                overwritten on every read
//! ```
//!
//! The vendor only distributes `PlexClient.dll` and its import library for
//! Windows. Neither is distributed here: build with the `sdk` feature and
//! point `PLEXCLIENT_LIB_DIR` at the directory holding `PlexClient.lib`.
//! Without `sdk`, [`available`] returns false and [`init_client`] fails
//! with [`ClientError::Unavailable`], so downstream code can keep running
//! with acquisition disabled.

use std::os::raw::c_int;

/// Raw layouts and entry points from `Plexon.h`.
///
/// ## Note: FFI integer types
///
/// `Plexon.h` is written for 32-bit Windows, where `unsigned long` is 32
/// bits wide. The record layouts below spell this out as `u32` rather than
/// `c_ulong` so that they keep the Windows layout on every target.
#[allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]
pub mod ffi {
    #[cfg(feature = "sdk")]
    use std::os::raw::{c_int, c_void};

    /// Samples in a [`PL_Wave`]
    pub const MAX_WF_LENGTH: usize = 56;
    /// Samples in a [`PL_WaveLong`]
    pub const MAX_WF_LENGTH_LONG: usize = 120;

    // Values of the `Type` field
    pub const PL_SingleWFType: i8 = 1;
    pub const PL_StereotrodeWFType: i8 = 2;
    pub const PL_TetrodeWFType: i8 = 3;
    pub const PL_ExtEventType: i8 = 4;
    pub const PL_ADDataType: i8 = 5;

    /// Timestamp-only MAP event
    #[repr(C)]
    #[derive(Clone, Copy, Debug, Default)]
    pub struct PL_Event {
        pub Type: i8,
        pub NumberOfBlocksInRecord: i8,
        pub BlockNumberInRecord: i8,
        pub UpperTS: u8,
        pub TimeStamp: u32,
        pub Channel: i16,
        pub Unit: i16,
        pub DataType: i8,
        pub NumberOfBlocksPerTimeStamp: i8,
        pub NumberOfDataWords: i16,
    }

    /// MAP event with a short waveform
    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct PL_Wave {
        pub Type: i8,
        pub NumberOfBlocksInRecord: i8,
        pub BlockNumberInRecord: i8,
        pub UpperTS: u8,
        pub TimeStamp: u32,
        pub Channel: i16,
        pub Unit: i16,
        pub DataType: i8,
        pub NumberOfBlocksPerTimeStamp: i8,
        pub NumberOfDataWords: i16,
        pub WaveForm: [i16; MAX_WF_LENGTH],
    }

    /// MAP event with a long waveform, as returned by
    /// `PL_GetLongWaveFormStructuresEx2`
    #[repr(C)]
    #[derive(Clone, Copy, Debug)]
    pub struct PL_WaveLong {
        pub Type: i8,
        pub NumberOfBlocksInRecord: i8,
        pub BlockNumberInRecord: i8,
        pub UpperTS: u8,
        pub TimeStamp: u32,
        pub Channel: i16,
        pub Unit: i16,
        pub DataType: i8,
        pub NumberOfBlocksPerTimeStamp: i8,
        pub NumberOfDataWords: i16,
        pub WaveForm: [i16; MAX_WF_LENGTH_LONG],
    }

    impl Default for PL_Wave {
        fn default() -> Self {
            PL_Wave {
                Type: 0,
                NumberOfBlocksInRecord: 0,
                BlockNumberInRecord: 0,
                UpperTS: 0,
                TimeStamp: 0,
                Channel: 0,
                Unit: 0,
                DataType: 0,
                NumberOfBlocksPerTimeStamp: 0,
                NumberOfDataWords: 0,
                WaveForm: [0; MAX_WF_LENGTH],
            }
        }
    }

    impl Default for PL_WaveLong {
        fn default() -> Self {
            PL_WaveLong {
                Type: 0,
                NumberOfBlocksInRecord: 0,
                BlockNumberInRecord: 0,
                UpperTS: 0,
                TimeStamp: 0,
                Channel: 0,
                Unit: 0,
                DataType: 0,
                NumberOfBlocksPerTimeStamp: 0,
                NumberOfDataWords: 0,
                WaveForm: [0; MAX_WF_LENGTH_LONG],
            }
        }
    }

    impl PL_WaveLong {
        /// Full 40-bit timestamp in ticks
        pub fn timestamp(&self) -> u64 {
            ((self.UpperTS as u64) << 32) | self.TimeStamp as u64
        }

        /// Valid prefix of `WaveForm`
        pub fn samples(&self) -> &[i16] {
            let n = (self.NumberOfDataWords.max(0) as usize).min(MAX_WF_LENGTH_LONG);
            &self.WaveForm[..n]
        }
    }

    #[cfg(feature = "sdk")]
    extern "C" {
        pub fn PL_InitClientEx3(r#type: c_int, hWndList: *mut c_void, hWndMain: *mut c_void) -> c_int;
        pub fn PL_CloseClient();
        pub fn PL_IsSortClientRunning() -> c_int;
        pub fn PL_GetTimeStampTick() -> c_int;
        pub fn PL_IsLongWaveMode() -> c_int;
        pub fn PL_GetSlowInfo(freq: *mut c_int, channels: *mut c_int, gains: *mut c_int);
        pub fn PL_GetLongWaveFormStructuresEx2(
            pnmax: *mut c_int,
            waves: *mut PL_WaveLong,
            serverdropped: *mut c_int,
            mmfdropped: *mut c_int,
            pollhigh: *mut c_int,
            polllow: *mut c_int,
        );
    }
}

pub use ffi::{PL_Event, PL_Wave, PL_WaveLong};

/// Room for the channel and gain tables written by `PL_GetSlowInfo`
#[cfg(feature = "sdk")]
const SLOW_INFO_LEN: usize = 256;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("PlexClient library is not available in this build")]
    Unavailable,
    #[error("MAP Server refused client registration")]
    Refused,
}

/// Auxiliary counters reported with every long waveform read
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DropCounters {
    pub server_dropped: i32,
    pub mmf_dropped: i32,
    pub poll_high: i32,
    pub poll_low: i32,
}

/// Whether the vendor library was linked into this build.
pub const fn available() -> bool {
    cfg!(feature = "sdk")
}

/// Register with the MAP Server and open its memory-mapped files.
#[cfg(feature = "sdk")]
pub fn init_client(client_type: i32) -> Result<(), ClientError> {
    let ok = unsafe {
        ffi::PL_InitClientEx3(client_type as c_int, std::ptr::null_mut(), std::ptr::null_mut())
    };
    if ok == 0 {
        return Err(ClientError::Refused);
    }
    Ok(())
}

#[cfg(not(feature = "sdk"))]
pub fn init_client(_client_type: i32) -> Result<(), ClientError> {
    Err(ClientError::Unavailable)
}

/// Release the client and tell the server to decrement its client count.
pub fn close_client() {
    #[cfg(feature = "sdk")]
    unsafe {
        ffi::PL_CloseClient()
    };
}

pub fn is_sort_client_running() -> bool {
    #[cfg(feature = "sdk")]
    let running = unsafe { ffi::PL_IsSortClientRunning() != 0 };
    #[cfg(not(feature = "sdk"))]
    let running = false;
    running
}

/// Timestamp resolution in microseconds
pub fn timestamp_tick() -> i32 {
    #[cfg(feature = "sdk")]
    let tick = unsafe { ffi::PL_GetTimeStampTick() };
    #[cfg(not(feature = "sdk"))]
    let tick: c_int = 0;
    tick as i32
}

pub fn is_long_wave_mode() -> bool {
    #[cfg(feature = "sdk")]
    let long = unsafe { ffi::PL_IsLongWaveMode() != 0 };
    #[cfg(not(feature = "sdk"))]
    let long = false;
    long
}

/// Sampling rate in Hz of the continuous (slow) A/D channels
pub fn slow_sample_rate() -> i32 {
    #[cfg(feature = "sdk")]
    let freq = {
        let mut freq: c_int = 0;
        let mut channels = [0 as c_int; SLOW_INFO_LEN];
        let mut gains = [0 as c_int; SLOW_INFO_LEN];
        unsafe { ffi::PL_GetSlowInfo(&mut freq, channels.as_mut_ptr(), gains.as_mut_ptr()) };
        freq
    };
    #[cfg(not(feature = "sdk"))]
    let freq: c_int = 0;
    freq as i32
}

/// Read every MAP event queued since the last call into `waves`.
///
/// Returns the number of events the library reports as written, which the
/// library bounds by `waves.len()`. Anything past that count is left over
/// from an earlier read.
pub fn get_long_wave_form_structures(waves: &mut [PL_WaveLong]) -> (usize, DropCounters) {
    #[allow(unused_mut)]
    let mut counters = DropCounters::default();
    if waves.is_empty() {
        return (0, counters);
    }
    #[cfg(feature = "sdk")]
    let num = {
        let mut num = waves.len().min(c_int::MAX as usize) as c_int;
        unsafe {
            ffi::PL_GetLongWaveFormStructuresEx2(
                &mut num,
                waves.as_mut_ptr(),
                &mut counters.server_dropped,
                &mut counters.mmf_dropped,
                &mut counters.poll_high,
                &mut counters.poll_low,
            )
        };
        num
    };
    #[cfg(not(feature = "sdk"))]
    let num: c_int = 0;
    (num.max(0) as usize, counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wave_long_timestamp_joins_upper_bits() {
        let w = PL_WaveLong { UpperTS: 1, TimeStamp: 7, ..Default::default() };
        assert_eq!(w.timestamp(), (1 << 32) + 7);
    }

    #[test]
    fn wave_long_samples_respect_data_words() {
        let mut w = PL_WaveLong { NumberOfDataWords: 3, ..Default::default() };
        w.WaveForm[..4].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(w.samples(), &[1, 2, 3]);
        w.NumberOfDataWords = -1;
        assert!(w.samples().is_empty());
        w.NumberOfDataWords = 500;
        assert_eq!(w.samples().len(), ffi::MAX_WF_LENGTH_LONG);
    }

    #[cfg(not(feature = "sdk"))]
    #[test]
    fn without_sdk_library_is_unavailable() {
        assert!(!available());
        assert_eq!(init_client(0), Err(ClientError::Unavailable));
        let mut waves = vec![PL_WaveLong::default(); 4];
        assert_eq!(get_long_wave_form_structures(&mut waves).0, 0);
    }
}
