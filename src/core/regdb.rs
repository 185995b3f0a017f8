//! S1G regulatory database
//!
//! Per-country channel lists handed to the radio before it boots. Lookup is
//! an exact, case-sensitive match on the two-letter country code.

use serde::Serialize;

/// One permitted S1G channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct S1gChannel {
    /// Centre frequency in Hz
    pub centre_freq_hz: u32,
    /// Duty cycle in hundredths of a percent (10000 = 100%)
    pub duty_cycle: u16,
    pub omit_control_response: bool,
    pub global_operating_class: u8,
    pub s1g_operating_class: u8,
    pub channel: u8,
    /// Operating bandwidth in MHz
    pub bandwidth_mhz: u8,
    /// Maximum transmit EIRP in dBm
    pub max_eirp_dbm: u8,
    /// Minimum packet spacing window in microseconds
    pub min_packet_spacing_us: u32,
    pub airtime_min_us: u32,
    pub airtime_max_us: u32,
}

/// Channel list for a single regulatory domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelList {
    pub country_code: &'static str,
    pub channels: &'static [S1gChannel],
}

/// Look up the channel list for `country_code`
pub fn lookup(country_code: &str) -> Option<&'static ChannelList> {
    DOMAINS.iter().find(|d| d.country_code == country_code)
}

/// Country codes present in the database
pub fn country_codes() -> impl Iterator<Item = &'static str> {
    DOMAINS.iter().map(|d| d.country_code)
}

#[allow(clippy::too_many_arguments)]
const fn ch(
    centre_freq_hz: u32,
    duty_cycle: u16,
    omit_control_response: bool,
    global_operating_class: u8,
    s1g_operating_class: u8,
    channel: u8,
    bandwidth_mhz: u8,
    max_eirp_dbm: u8,
    min_packet_spacing_us: u32,
    airtime_min_us: u32,
    airtime_max_us: u32,
) -> S1gChannel {
    S1gChannel {
        centre_freq_hz,
        duty_cycle,
        omit_control_response,
        global_operating_class,
        s1g_operating_class,
        channel,
        bandwidth_mhz,
        max_eirp_dbm,
        min_packet_spacing_us,
        airtime_min_us,
        airtime_max_us,
    }
}

const CHANNELS_AU: &[S1gChannel] = &[
    ch(915500000, 10000, false, 68, 22, 27, 1, 30, 0, 0, 0),
    ch(916500000, 10000, false, 68, 22, 29, 1, 30, 0, 0, 0),
    ch(917500000, 10000, false, 68, 22, 31, 1, 30, 0, 0, 0),
    ch(918500000, 10000, false, 68, 22, 33, 1, 30, 0, 0, 0),
    ch(919500000, 10000, false, 68, 22, 35, 1, 30, 0, 0, 0),
    ch(920500000, 10000, false, 68, 22, 37, 1, 30, 0, 0, 0),
    ch(921500000, 10000, false, 68, 22, 39, 1, 30, 0, 0, 0),
    ch(922500000, 10000, false, 68, 22, 41, 1, 30, 0, 0, 0),
    ch(923500000, 10000, false, 68, 22, 43, 1, 30, 0, 0, 0),
    ch(924500000, 10000, false, 68, 22, 45, 1, 30, 0, 0, 0),
    ch(925500000, 10000, false, 68, 22, 47, 1, 30, 0, 0, 0),
    ch(926500000, 10000, false, 68, 22, 49, 1, 30, 0, 0, 0),
    ch(927500000, 10000, false, 68, 22, 51, 1, 30, 0, 0, 0),
    ch(917000000, 10000, false, 69, 23, 30, 2, 30, 0, 0, 0),
    ch(919000000, 10000, false, 69, 23, 34, 2, 30, 0, 0, 0),
    ch(921000000, 10000, false, 69, 23, 38, 2, 30, 0, 0, 0),
    ch(923000000, 10000, false, 69, 23, 42, 2, 30, 0, 0, 0),
    ch(925000000, 10000, false, 69, 23, 46, 2, 30, 0, 0, 0),
    ch(927000000, 10000, false, 69, 23, 50, 2, 30, 0, 0, 0),
    ch(918000000, 10000, false, 70, 24, 32, 4, 30, 0, 0, 0),
    ch(922000000, 10000, false, 70, 24, 40, 4, 30, 0, 0, 0),
    ch(926000000, 10000, false, 70, 24, 48, 4, 30, 0, 0, 0),
    ch(924000000, 10000, false, 71, 25, 44, 8, 30, 0, 0, 0),
];

const CHANNELS_CA: &[S1gChannel] = &[
    ch(902500000, 10000, false, 68, 1, 1, 1, 36, 0, 0, 0),
    ch(903500000, 10000, false, 68, 1, 3, 1, 36, 0, 0, 0),
    ch(904500000, 10000, false, 68, 1, 5, 1, 36, 0, 0, 0),
    ch(905500000, 10000, false, 68, 1, 7, 1, 36, 0, 0, 0),
    ch(906500000, 10000, false, 68, 1, 9, 1, 36, 0, 0, 0),
    ch(907500000, 10000, false, 68, 1, 11, 1, 36, 0, 0, 0),
    ch(908500000, 10000, false, 68, 1, 13, 1, 36, 0, 0, 0),
    ch(909500000, 10000, false, 68, 1, 15, 1, 36, 0, 0, 0),
    ch(910500000, 10000, false, 68, 1, 17, 1, 36, 0, 0, 0),
    ch(911500000, 10000, false, 68, 1, 19, 1, 36, 0, 0, 0),
    ch(912500000, 10000, false, 68, 1, 21, 1, 36, 0, 0, 0),
    ch(913500000, 10000, false, 68, 1, 23, 1, 36, 0, 0, 0),
    ch(914500000, 10000, false, 68, 1, 25, 1, 36, 0, 0, 0),
    ch(915500000, 10000, false, 68, 1, 27, 1, 36, 0, 0, 0),
    ch(916500000, 10000, false, 68, 1, 29, 1, 36, 0, 0, 0),
    ch(917500000, 10000, false, 68, 1, 31, 1, 36, 0, 0, 0),
    ch(918500000, 10000, false, 68, 1, 33, 1, 36, 0, 0, 0),
    ch(919500000, 10000, false, 68, 1, 35, 1, 36, 0, 0, 0),
    ch(920500000, 10000, false, 68, 1, 37, 1, 36, 0, 0, 0),
    ch(921500000, 10000, false, 68, 1, 39, 1, 36, 0, 0, 0),
    ch(922500000, 10000, false, 68, 1, 41, 1, 36, 0, 0, 0),
    ch(923500000, 10000, false, 68, 1, 43, 1, 36, 0, 0, 0),
    ch(924500000, 10000, false, 68, 1, 45, 1, 36, 0, 0, 0),
    ch(925500000, 10000, false, 68, 1, 47, 1, 36, 0, 0, 0),
    ch(926500000, 10000, false, 68, 1, 49, 1, 36, 0, 0, 0),
    ch(927500000, 10000, false, 68, 1, 51, 1, 36, 0, 0, 0),
    ch(903000000, 10000, false, 69, 2, 2, 2, 36, 0, 0, 0),
    ch(905000000, 10000, false, 69, 2, 6, 2, 36, 0, 0, 0),
    ch(907000000, 10000, false, 69, 2, 10, 2, 36, 0, 0, 0),
    ch(909000000, 10000, false, 69, 2, 14, 2, 36, 0, 0, 0),
    ch(911000000, 10000, false, 69, 2, 18, 2, 36, 0, 0, 0),
    ch(913000000, 10000, false, 69, 2, 22, 2, 36, 0, 0, 0),
    ch(915000000, 10000, false, 69, 2, 26, 2, 36, 0, 0, 0),
    ch(917000000, 10000, false, 69, 2, 30, 2, 36, 0, 0, 0),
    ch(919000000, 10000, false, 69, 2, 34, 2, 36, 0, 0, 0),
    ch(921000000, 10000, false, 69, 2, 38, 2, 36, 0, 0, 0),
    ch(923000000, 10000, false, 69, 2, 42, 2, 36, 0, 0, 0),
    ch(925000000, 10000, false, 69, 2, 46, 2, 36, 0, 0, 0),
    ch(927000000, 10000, false, 69, 2, 50, 2, 36, 0, 0, 0),
    ch(906000000, 10000, false, 70, 3, 8, 4, 36, 0, 0, 0),
    ch(910000000, 10000, false, 70, 3, 16, 4, 36, 0, 0, 0),
    ch(914000000, 10000, false, 70, 3, 24, 4, 36, 0, 0, 0),
    ch(918000000, 10000, false, 70, 3, 32, 4, 36, 0, 0, 0),
    ch(922000000, 10000, false, 70, 3, 40, 4, 36, 0, 0, 0),
    ch(926000000, 10000, false, 70, 3, 48, 4, 36, 0, 0, 0),
    ch(908000000, 10000, false, 71, 4, 12, 8, 36, 0, 0, 0),
    ch(916000000, 10000, false, 71, 4, 28, 8, 36, 0, 0, 0),
    ch(924000000, 10000, false, 71, 4, 44, 8, 36, 0, 0, 0),
];

const CHANNELS_EU: &[S1gChannel] = &[
    ch(863500000, 10000, false, 66, 6, 1, 1, 16, 0, 0, 0),
    ch(864500000, 10000, false, 66, 6, 3, 1, 16, 0, 0, 0),
    ch(865500000, 10000, false, 66, 6, 5, 1, 16, 0, 0, 0),
    ch(866500000, 10000, false, 66, 6, 7, 1, 16, 0, 0, 0),
    ch(867500000, 10000, false, 66, 6, 9, 1, 16, 0, 0, 0),
    ch(864000000, 10000, false, 67, 7, 2, 2, 16, 0, 0, 0),
    ch(866000000, 10000, false, 67, 7, 6, 2, 16, 0, 0, 0),
];

const CHANNELS_GB: &[S1gChannel] = &[
    ch(863500000, 10000, false, 66, 6, 1, 1, 16, 0, 0, 0),
    ch(864500000, 10000, false, 66, 6, 3, 1, 16, 0, 0, 0),
    ch(865500000, 10000, false, 66, 6, 5, 1, 16, 0, 0, 0),
    ch(866500000, 10000, false, 66, 6, 7, 1, 16, 0, 0, 0),
    ch(867500000, 10000, false, 66, 6, 9, 1, 16, 0, 0, 0),
    ch(864000000, 10000, false, 67, 7, 2, 2, 16, 0, 0, 0),
    ch(866000000, 10000, false, 67, 7, 6, 2, 16, 0, 0, 0),
    ch(917900000, 280, false, 77, 30, 33, 1, 16, 0, 0, 0),
    ch(918900000, 280, false, 77, 30, 35, 1, 16, 0, 0, 0),
];

const CHANNELS_IN: &[S1gChannel] = &[
    ch(865500000, 280, false, 66, 6, 5, 1, 16, 0, 0, 0),
    ch(866500000, 280, false, 66, 6, 7, 1, 16, 0, 0, 0),
    ch(867500000, 280, false, 66, 6, 9, 1, 16, 0, 0, 0),
];

const CHANNELS_JP: &[S1gChannel] = &[
    ch(921000000, 1000, true, 73, 8, 9, 1, 16, 2000, 2000, 100000),
    ch(923000000, 1000, true, 73, 8, 13, 1, 16, 2000, 2000, 100000),
    ch(924000000, 1000, true, 73, 8, 15, 1, 16, 2000, 2000, 100000),
    ch(925000000, 1000, true, 73, 8, 17, 1, 16, 2000, 2000, 100000),
    ch(926000000, 1000, true, 73, 8, 19, 1, 16, 2000, 2000, 100000),
    ch(927000000, 1000, true, 73, 8, 21, 1, 16, 2000, 2000, 100000),
    ch(923500000, 1000, true, 64, 9, 2, 2, 16, 2000, 2000, 100000),
    ch(924500000, 1000, true, 64, 10, 4, 2, 16, 2000, 2000, 100000),
    ch(925500000, 1000, true, 64, 9, 6, 2, 16, 2000, 2000, 100000),
    ch(926500000, 1000, true, 64, 10, 8, 2, 16, 2000, 2000, 100000),
    ch(924500000, 1000, true, 65, 11, 36, 4, 16, 2000, 2000, 100000),
    ch(925500000, 1000, true, 65, 12, 38, 4, 16, 2000, 2000, 100000),
];

const CHANNELS_KR: &[S1gChannel] = &[
    ch(918000000, 10000, false, 74, 14, 1, 1, 4, 50000, 0, 4000000),
    ch(919000000, 10000, false, 74, 14, 3, 1, 4, 50000, 0, 4000000),
    ch(920000000, 10000, false, 74, 14, 5, 1, 4, 50000, 0, 4000000),
    ch(921000000, 10000, false, 74, 14, 7, 1, 4, 50000, 0, 4000000),
    ch(922000000, 10000, false, 74, 14, 9, 1, 10, 50000, 0, 4000000),
    ch(923000000, 10000, false, 74, 14, 11, 1, 10, 50000, 0, 4000000),
    ch(918500000, 10000, false, 75, 15, 2, 2, 4, 50000, 0, 4000000),
    ch(920500000, 10000, false, 75, 15, 6, 2, 4, 50000, 0, 4000000),
    ch(922500000, 10000, false, 75, 15, 10, 2, 10, 50000, 0, 4000000),
    ch(921500000, 10000, false, 76, 16, 8, 4, 4, 50000, 0, 4000000),
    ch(926500000, 10000, false, 74, 14, 18, 1, 17, 264, 0, 220000),
    ch(927500000, 10000, false, 74, 14, 20, 1, 17, 264, 0, 220000),
    ch(928500000, 10000, false, 74, 14, 22, 1, 17, 264, 0, 220000),
    ch(929500000, 10000, false, 74, 14, 24, 1, 17, 264, 0, 220000),
    ch(927000000, 10000, false, 75, 15, 19, 2, 20, 264, 0, 220000),
    ch(929000000, 10000, false, 75, 15, 23, 2, 20, 264, 0, 220000),
];

const CHANNELS_NZ: &[S1gChannel] = &[
    ch(915500000, 10000, false, 68, 26, 27, 1, 30, 0, 0, 0),
    ch(916500000, 10000, false, 68, 26, 29, 1, 30, 0, 0, 0),
    ch(917500000, 10000, false, 68, 26, 31, 1, 30, 0, 0, 0),
    ch(918500000, 10000, false, 68, 26, 33, 1, 30, 0, 0, 0),
    ch(919500000, 10000, false, 68, 26, 35, 1, 30, 0, 0, 0),
    ch(920500000, 10000, false, 68, 26, 37, 1, 36, 0, 0, 0),
    ch(921500000, 10000, false, 68, 26, 39, 1, 36, 0, 0, 0),
    ch(922500000, 10000, false, 68, 26, 41, 1, 36, 0, 0, 0),
    ch(923500000, 10000, false, 68, 26, 43, 1, 36, 0, 0, 0),
    ch(924500000, 10000, false, 68, 26, 45, 1, 36, 0, 0, 0),
    ch(925500000, 10000, false, 68, 26, 47, 1, 36, 0, 0, 0),
    ch(926500000, 10000, false, 68, 26, 49, 1, 36, 0, 0, 0),
    ch(927500000, 10000, false, 68, 26, 51, 1, 36, 0, 0, 0),
    ch(917000000, 10000, false, 69, 27, 30, 2, 30, 0, 0, 0),
    ch(919000000, 10000, false, 69, 27, 34, 2, 30, 0, 0, 0),
    ch(921000000, 10000, false, 69, 27, 38, 2, 36, 0, 0, 0),
    ch(923000000, 10000, false, 69, 27, 42, 2, 36, 0, 0, 0),
    ch(925000000, 10000, false, 69, 27, 46, 2, 36, 0, 0, 0),
    ch(927000000, 10000, false, 69, 27, 50, 2, 36, 0, 0, 0),
    ch(918000000, 10000, false, 70, 28, 32, 4, 30, 0, 0, 0),
    ch(922000000, 10000, false, 70, 28, 40, 4, 36, 0, 0, 0),
    ch(926000000, 10000, false, 70, 28, 48, 4, 36, 0, 0, 0),
    ch(924000000, 10000, false, 71, 29, 44, 8, 36, 0, 0, 0),
];

const CHANNELS_US: &[S1gChannel] = &[
    ch(902500000, 10000, false, 68, 1, 1, 1, 36, 0, 0, 0),
    ch(903500000, 10000, false, 68, 1, 3, 1, 36, 0, 0, 0),
    ch(904500000, 10000, false, 68, 1, 5, 1, 36, 0, 0, 0),
    ch(905500000, 10000, false, 68, 1, 7, 1, 36, 0, 0, 0),
    ch(906500000, 10000, false, 68, 1, 9, 1, 36, 0, 0, 0),
    ch(907500000, 10000, false, 68, 1, 11, 1, 36, 0, 0, 0),
    ch(908500000, 10000, false, 68, 1, 13, 1, 36, 0, 0, 0),
    ch(909500000, 10000, false, 68, 1, 15, 1, 36, 0, 0, 0),
    ch(910500000, 10000, false, 68, 1, 17, 1, 36, 0, 0, 0),
    ch(911500000, 10000, false, 68, 1, 19, 1, 36, 0, 0, 0),
    ch(912500000, 10000, false, 68, 1, 21, 1, 36, 0, 0, 0),
    ch(913500000, 10000, false, 68, 1, 23, 1, 36, 0, 0, 0),
    ch(914500000, 10000, false, 68, 1, 25, 1, 36, 0, 0, 0),
    ch(915500000, 10000, false, 68, 1, 27, 1, 36, 0, 0, 0),
    ch(916500000, 10000, false, 68, 1, 29, 1, 36, 0, 0, 0),
    ch(917500000, 10000, false, 68, 1, 31, 1, 36, 0, 0, 0),
    ch(918500000, 10000, false, 68, 1, 33, 1, 36, 0, 0, 0),
    ch(919500000, 10000, false, 68, 1, 35, 1, 36, 0, 0, 0),
    ch(920500000, 10000, false, 68, 1, 37, 1, 36, 0, 0, 0),
    ch(921500000, 10000, false, 68, 1, 39, 1, 36, 0, 0, 0),
    ch(922500000, 10000, false, 68, 1, 41, 1, 36, 0, 0, 0),
    ch(923500000, 10000, false, 68, 1, 43, 1, 36, 0, 0, 0),
    ch(924500000, 10000, false, 68, 1, 45, 1, 36, 0, 0, 0),
    ch(925500000, 10000, false, 68, 1, 47, 1, 36, 0, 0, 0),
    ch(926500000, 10000, false, 68, 1, 49, 1, 36, 0, 0, 0),
    ch(927500000, 10000, false, 68, 1, 51, 1, 36, 0, 0, 0),
    ch(903000000, 10000, false, 69, 2, 2, 2, 36, 0, 0, 0),
    ch(905000000, 10000, false, 69, 2, 6, 2, 36, 0, 0, 0),
    ch(907000000, 10000, false, 69, 2, 10, 2, 36, 0, 0, 0),
    ch(909000000, 10000, false, 69, 2, 14, 2, 36, 0, 0, 0),
    ch(911000000, 10000, false, 69, 2, 18, 2, 36, 0, 0, 0),
    ch(913000000, 10000, false, 69, 2, 22, 2, 36, 0, 0, 0),
    ch(915000000, 10000, false, 69, 2, 26, 2, 36, 0, 0, 0),
    ch(917000000, 10000, false, 69, 2, 30, 2, 36, 0, 0, 0),
    ch(919000000, 10000, false, 69, 2, 34, 2, 36, 0, 0, 0),
    ch(921000000, 10000, false, 69, 2, 38, 2, 36, 0, 0, 0),
    ch(923000000, 10000, false, 69, 2, 42, 2, 36, 0, 0, 0),
    ch(925000000, 10000, false, 69, 2, 46, 2, 36, 0, 0, 0),
    ch(927000000, 10000, false, 69, 2, 50, 2, 36, 0, 0, 0),
    ch(906000000, 10000, false, 70, 3, 8, 4, 36, 0, 0, 0),
    ch(910000000, 10000, false, 70, 3, 16, 4, 36, 0, 0, 0),
    ch(914000000, 10000, false, 70, 3, 24, 4, 36, 0, 0, 0),
    ch(918000000, 10000, false, 70, 3, 32, 4, 36, 0, 0, 0),
    ch(922000000, 10000, false, 70, 3, 40, 4, 36, 0, 0, 0),
    ch(926000000, 10000, false, 70, 3, 48, 4, 36, 0, 0, 0),
    ch(908000000, 10000, false, 71, 4, 12, 8, 36, 0, 0, 0),
    ch(916000000, 10000, false, 71, 4, 28, 8, 36, 0, 0, 0),
    ch(924000000, 10000, false, 71, 4, 44, 8, 36, 0, 0, 0),
];

static DOMAINS: &[ChannelList] = &[
    ChannelList {
        country_code: "AU",
        channels: CHANNELS_AU,
    },
    ChannelList {
        country_code: "CA",
        channels: CHANNELS_CA,
    },
    ChannelList {
        country_code: "EU",
        channels: CHANNELS_EU,
    },
    ChannelList {
        country_code: "GB",
        channels: CHANNELS_GB,
    },
    ChannelList {
        country_code: "IN",
        channels: CHANNELS_IN,
    },
    ChannelList {
        country_code: "JP",
        channels: CHANNELS_JP,
    },
    ChannelList {
        country_code: "KR",
        channels: CHANNELS_KR,
    },
    ChannelList {
        country_code: "NZ",
        channels: CHANNELS_NZ,
    },
    ChannelList {
        country_code: "US",
        channels: CHANNELS_US,
    },
];
