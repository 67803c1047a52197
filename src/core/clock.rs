//! Simulated clock: time of day, day, season, year and weather
//!
//! The clock only moves forward, one period at a time. Crossing the last
//! period of a day reports a day boundary so the game loop can run its
//! once-per-day hook before the next turn opens.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Periods of a day, in cyclic order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    #[default]
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 4] = [
        TimeOfDay::Morning,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    /// Position within the day, starting at 0
    pub fn index(&self) -> u32 {
        match self {
            Self::Morning => 0,
            Self::Afternoon => 1,
            Self::Evening => 2,
            Self::Night => 3,
        }
    }

    /// The following period; Night wraps to Morning
    pub fn next(&self) -> Self {
        match self {
            Self::Morning => Self::Afternoon,
            Self::Afternoon => Self::Evening,
            Self::Evening => Self::Night,
            Self::Night => Self::Morning,
        }
    }

    pub fn is_last(&self) -> bool {
        *self == Self::Night
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Seasons of the farming year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub fn next(&self) -> Self {
        match self {
            Self::Spring => Self::Summer,
            Self::Summer => Self::Fall,
            Self::Fall => Self::Winter,
            Self::Winter => Self::Spring,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::Winter => "Winter",
        }
    }

    /// Weather probabilities [Sunny, Cloudy, Rainy, Stormy, Drought]
    pub fn weather_weights(&self) -> [f32; 5] {
        match self {
            Self::Spring => [0.35, 0.25, 0.3, 0.1, 0.0],
            Self::Summer => [0.5, 0.15, 0.1, 0.1, 0.15],
            Self::Fall => [0.3, 0.35, 0.25, 0.1, 0.0],
            Self::Winter => [0.25, 0.45, 0.15, 0.15, 0.0],
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Current weather condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Drought,
}

impl Weather {
    const ORDER: [Weather; 5] = [
        Weather::Sunny,
        Weather::Cloudy,
        Weather::Rainy,
        Weather::Stormy,
        Weather::Drought,
    ];

    /// Roll weather for a day of the given season
    pub fn roll<R: Rng + ?Sized>(season: Season, rng: &mut R) -> Self {
        let weights = season.weather_weights();
        let total: f32 = weights.iter().sum();
        let mut pick = rng.gen::<f32>() * total;
        for (weather, weight) in Self::ORDER.iter().zip(weights) {
            if pick < weight {
                return *weather;
            }
            pick -= weight;
        }
        Self::Sunny
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
            Self::Stormy => "Stormy",
            Self::Drought => "Drought",
        }
    }
}

impl fmt::Display for Weather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Frozen view of the clock, stored on every turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub weather: Weather,
}

/// Which boundaries a single `advance_period` call crossed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodAdvance {
    pub new_day: bool,
    pub new_season: bool,
    pub new_year: bool,
}

/// Canonical simulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    pub day: u32,
    pub time_of_day: TimeOfDay,
    pub season: Season,
    pub year: u32,
    pub weather: Weather,
    days_per_season: u32,
}

impl GameClock {
    /// Day 1, Morning, Spring of year 1, sunny
    pub fn new(days_per_season: u32) -> Self {
        Self {
            day: 1,
            time_of_day: TimeOfDay::Morning,
            season: Season::Spring,
            year: 1,
            weather: Weather::Sunny,
            days_per_season: days_per_season.max(1),
        }
    }

    pub fn days_per_season(&self) -> u32 {
        self.days_per_season
    }

    /// Move forward one period, reporting any boundaries crossed
    pub fn advance_period(&mut self) -> PeriodAdvance {
        let mut advance = PeriodAdvance::default();

        let wrapped = self.time_of_day.is_last();
        self.time_of_day = self.time_of_day.next();
        if !wrapped {
            return advance;
        }

        self.day += 1;
        advance.new_day = true;

        if (self.day - 1) % self.days_per_season == 0 {
            self.season = self.season.next();
            advance.new_season = true;
            if self.season == Season::Spring {
                self.year += 1;
                advance.new_year = true;
            }
        }

        advance
    }

    /// Jump to a period within the current day without crossing a boundary
    pub fn set_time_of_day(&mut self, time_of_day: TimeOfDay) {
        self.time_of_day = time_of_day;
    }

    pub fn set_weather(&mut self, weather: Weather) {
        self.weather = weather;
    }

    /// Periods elapsed since day 1, Morning; strictly increases with every advance
    pub fn elapsed_periods(&self) -> u64 {
        (self.day as u64 - 1) * TimeOfDay::ALL.len() as u64 + self.time_of_day.index() as u64
    }

    pub fn snapshot(&self) -> ClockSnapshot {
        ClockSnapshot {
            day: self.day,
            time_of_day: self.time_of_day,
            season: self.season,
            weather: self.weather,
        }
    }

    /// Human-readable form: "Year 1, Spring, Day 3, Evening"
    pub fn description(&self) -> String {
        format!(
            "Year {}, {}, Day {}, {}",
            self.year, self.season, self.day, self.time_of_day
        )
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(28)
    }
}
