//! Maps Hebrew calendar events onto a curated tag taxonomy and builds the
//! per-day event context that decides which prayer times apply.

pub mod adapter;
pub mod audit;
pub mod catalog;
pub mod context;
pub mod dates;
pub mod error;
pub mod hdate;
pub mod hebcal;
pub mod location;
pub mod pattern;
pub mod resolver;
pub mod store;

pub use adapter::{AdapterOptions, CalendarAdapter, Holiday, HolidayCategory, TransliterationStyle};
pub use catalog::{FastStartType, Tag, TagCatalog, TagPattern, TagType};
pub use context::{ActiveEvent, CalendarService, DayContext, DayInfo, WeekInfo, ZmanimContext};
pub use dates::HebrewDate;
pub use error::{CalendarError, Result, StoreError};
pub use hdate::{HDate, HMonth};
pub use location::Location;
pub use pattern::{MatchType, matches};
pub use resolver::{DayPosition, Resolution, TagResolver};
pub use store::{EventMetadata, MemoryPatternStore, PatternStore, PgPatternStore, PgStoreOptions, TagMatch};
