//! Shared record fixtures for the integration tests

#![allow(dead_code)]

use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeDelta};
use lsondb::{enumeration, record};
use num_bigint::BigInt;
use rust_decimal::Decimal;
use tempfile::TempDir;
use url::Url;
use uuid::Uuid;

// =============================================================================
// Helper Functions
// =============================================================================

pub fn setup_temp_root() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i32,
}

record!(Person { name, age });

pub fn person(name: &str, age: i32) -> Person {
    Person {
        name: name.to_string(),
        age,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Color {
    #[default]
    Red,
    Green,
    Blue,
}

enumeration!(Color { Red, Green, Blue });

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Priority {
    #[default]
    Low,
    High,
}

enumeration!(Priority: u8 { Low, High });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubClass {
    pub id: i32,
    pub label: String,
    pub weight: Option<f64>,
}

record!(SubClass { id, label, weight });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scored {
    pub name: String,
    pub score: f64,
}

record!(Scored { name, score });

/// A single text member, so an empty text encodes to an empty line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub text: String,
}

record!(Note { text });

pub fn note(text: &str) -> Note {
    Note {
        text: text.to_string(),
    }
}

/// Text values that read back differently from how they were written
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Memo {
    pub title: String,
    pub body: Option<String>,
    pub tags: Vec<String>,
}

record!(Memo { title, body, tags: list });

/// A shape with no serializable members
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Empty;

record!(Empty {});

/// Composite inside a composite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wrapper {
    pub sub: SubClass,
}

record!(Wrapper { sub });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Nested {
    pub name: String,
    pub wrapper: Wrapper,
}

record!(Nested { name, wrapper });

/// Sequence inside a composite
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bag {
    pub items: Vec<i32>,
}

record!(Bag { items: list });

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BagHolder {
    pub bag: Bag,
}

record!(BagHolder { bag });

/// Every supported kind, plain, nullable and as sequences
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllTypes {
    pub flag: bool,
    pub letter: char,
    pub tiny: i8,
    pub small: i16,
    pub medium: i32,
    pub large: i64,
    pub byte: u8,
    pub ushort: u16,
    pub uint: u32,
    pub ulong: u64,
    pub huge: BigInt,
    pub single: f32,
    pub double: f64,
    pub money: Decimal,
    pub stamp: NaiveDateTime,
    pub moment: DateTime<FixedOffset>,
    pub span: TimeDelta,
    pub id: Uuid,
    pub link: Option<Url>,
    pub text: String,
    pub blob: Vec<u8>,
    pub color: Color,
    pub priority: Priority,
    pub sub: SubClass,

    pub maybe_flag: Option<bool>,
    pub maybe_letter: Option<char>,
    pub maybe_int: Option<i32>,
    pub maybe_ulong: Option<u64>,
    pub maybe_huge: Option<BigInt>,
    pub maybe_double: Option<f64>,
    pub maybe_money: Option<Decimal>,
    pub maybe_stamp: Option<NaiveDateTime>,
    pub maybe_moment: Option<DateTime<FixedOffset>>,
    pub maybe_span: Option<TimeDelta>,
    pub maybe_id: Option<Uuid>,
    pub maybe_text: Option<String>,
    pub maybe_blob: Option<Vec<u8>>,
    pub maybe_color: Option<Color>,
    pub maybe_sub: Option<SubClass>,

    pub numbers: Vec<i32>,
    pub words: Vec<String>,
    pub stamps: Vec<NaiveDateTime>,
    pub colors: Vec<Color>,
    pub maybe_numbers: Vec<Option<i64>>,
    pub subs: Vec<SubClass>,
}

record!(AllTypes {
    flag,
    letter,
    tiny,
    small,
    medium,
    large,
    byte,
    ushort,
    uint,
    ulong,
    huge,
    single,
    double,
    money,
    stamp,
    moment,
    span,
    id,
    link,
    text,
    blob,
    color,
    priority,
    sub,
    maybe_flag,
    maybe_letter,
    maybe_int,
    maybe_ulong,
    maybe_huge,
    maybe_double,
    maybe_money,
    maybe_stamp,
    maybe_moment,
    maybe_span,
    maybe_id,
    maybe_text,
    maybe_blob,
    maybe_color,
    maybe_sub,
    numbers: list,
    words: list,
    stamps: list,
    colors: list,
    maybe_numbers: list,
    subs: list,
});

pub fn stamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 29)
        .unwrap()
        .and_hms_nano_opt(13, 45, 7, 123_456_700)
        .unwrap()
}

pub fn moment() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2023-11-05T08:30:00.5+09:30").unwrap()
}

pub fn sub(id: i32, label: &str, weight: Option<f64>) -> SubClass {
    SubClass {
        id,
        label: label.to_string(),
        weight,
    }
}

/// Every member set to a non-default value
pub fn sample_all_types() -> AllTypes {
    AllTypes {
        flag: true,
        letter: 'λ',
        tiny: -8,
        small: -1600,
        medium: 320_000,
        large: -64_000_000_000,
        byte: 200,
        ushort: 60_000,
        uint: 4_000_000_000,
        ulong: 18_000_000_000_000_000_000,
        huge: BigInt::from_str("-123456789012345678901234567890").unwrap(),
        single: 3.25,
        double: 0.1 + 0.2,
        money: Decimal::from_str("1234.5600").unwrap(),
        stamp: stamp(),
        moment: moment(),
        span: TimeDelta::new(90_061, 250_000_000).unwrap(),
        id: Uuid::from_u128(0x6f9619ff_8b86_d011_b42d_00c04fc964ff),
        link: Some(Url::parse("https://example.com/tables?name=People").unwrap()),
        text: "plain text, with punctuation; and spaces".to_string(),
        blob: b"binary-ish".to_vec(),
        color: Color::Blue,
        priority: Priority::High,
        sub: sub(7, "seven", Some(7.5)),

        maybe_flag: Some(false),
        maybe_letter: Some('x'),
        maybe_int: Some(-42),
        maybe_ulong: Some(u64::MAX),
        maybe_huge: Some(BigInt::from(10).pow(40)),
        maybe_double: Some(-2.5e-300),
        maybe_money: Some(Decimal::from_str("-0.001").unwrap()),
        maybe_stamp: Some(stamp()),
        maybe_moment: Some(moment()),
        maybe_span: Some(TimeDelta::new(-5, 300).unwrap()),
        maybe_id: Some(Uuid::nil()),
        maybe_text: Some("present".to_string()),
        maybe_blob: Some(vec![b'o', b'k']),
        maybe_color: Some(Color::Green),
        maybe_sub: Some(sub(-1, "negative", None)),

        numbers: vec![1, -2, 3],
        words: vec!["alpha".to_string(), "beta".to_string()],
        stamps: vec![stamp(), NaiveDateTime::default()],
        colors: vec![Color::Red, Color::Blue],
        maybe_numbers: vec![Some(1), None, Some(-3)],
        subs: vec![sub(1, "one", Some(1.0)), sub(2, "two", None)],
    }
}

/// Every nullable member absent, every sequence empty
pub fn sparse_all_types() -> AllTypes {
    AllTypes {
        medium: 1,
        ..AllTypes::default()
    }
}
