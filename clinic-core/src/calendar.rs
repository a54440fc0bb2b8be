//! Trục lịch của heatmap: 7 thứ trong tuần và 24 khung giờ theo đồng hồ 12 giờ.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::DashboardError;

/// Thứ trong tuần, bắt đầu từ thứ Hai (chỉ số 0).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// Vị trí hàng trên heatmap.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self::from(timestamp.weekday())
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl FromStr for Weekday {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::UnknownWeekday(value.to_string()))
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Khung giờ check-in, hiển thị dạng `"09 AM"`; giữ giờ 0..=23 bên trong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HourBucket(u8);

impl HourBucket {
    pub const COUNT: usize = 24;

    pub fn new(hour: u32) -> Option<Self> {
        (hour < Self::COUNT as u32).then_some(Self(hour as u8))
    }

    pub fn of(timestamp: &NaiveDateTime) -> Self {
        Self(timestamp.hour() as u8)
    }

    /// Toàn bộ 24 khung giờ từ "12 AM" tới "11 PM".
    pub fn all() -> impl Iterator<Item = HourBucket> {
        (0..Self::COUNT as u8).map(HourBucket)
    }

    pub fn hour(self) -> u32 {
        u32::from(self.0)
    }

    /// Vị trí cột trên heatmap.
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    pub fn label(self) -> String {
        let hour = self.0 % 12;
        let display = if hour == 0 { 12 } else { hour };
        let meridiem = if self.0 < 12 { "AM" } else { "PM" };
        format!("{display:02} {meridiem}")
    }
}

impl FromStr for HourBucket {
    type Err = DashboardError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let unknown = || DashboardError::UnknownHourBucket(value.to_string());

        let (hour, meridiem) = value.trim().split_once(' ').ok_or_else(unknown)?;
        let hour: u8 = hour.trim().parse().map_err(|_| unknown())?;
        if !(1..=12).contains(&hour) {
            return Err(unknown());
        }

        let base = hour % 12;
        match meridiem.trim().to_ascii_uppercase().as_str() {
            "AM" => Ok(Self(base)),
            "PM" => Ok(Self(base + 12)),
            _ => Err(unknown()),
        }
    }
}

impl TryFrom<String> for HourBucket {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HourBucket> for String {
    fn from(bucket: HourBucket) -> Self {
        bucket.label()
    }
}

impl fmt::Display for HourBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
