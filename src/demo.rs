//! The fixed demonstration sequence run by the app.

use chrono::NaiveDate;
use tracing::info;

use crate::error::{OrmError, OrmResult};
use crate::helper::OrmHelper;
use crate::logging::{log_object, log_query_results, log_section};
use crate::model::{Entity, Record};

pub const ORDER_BY_ID_DESC: &str = "ORDER BY id DESC";
pub const VALUE_ABOVE: &str = "value > 1.5";
pub const VALUE_ABOVE_BY_DATE_DESC: &str = "value > 1.5 ORDER BY date DESC";

/// What each step of [`run`] observed.
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub cleared: usize,
    pub all: Vec<Record>,
    pub ordered_by_id_desc: Vec<Record>,
    pub filtered: Vec<Record>,
    pub filtered_by_date_desc: Vec<Record>,
    pub fetched: Record,
    pub updated: Record,
    pub remaining: Vec<Record>,
}

/// The three records the demo inserts.
pub fn sample_records() -> OrmResult<Vec<Record>> {
    Ok(vec![
        Record::new(1, "A1", date("1981-01-01")?, true, 1.1),
        Record::new(2, "A2", date("1982-02-02")?, false, 2.2),
        Record::new(3, "A3", date("1983-03-03")?, false, 3.3),
    ])
}

pub fn run(helper: &OrmHelper<'_>) -> OrmResult<DemoReport> {
    log_section("deleting all existing Record objects");
    let cleared = helper.delete_all::<Record>(None)?;
    info!(cleared, "table cleared");

    log_section("creating and saving three Record objects (A1, A2 and A3)");
    for record in sample_records()? {
        helper.insert(&record)?;
    }

    log_section("get_objects for all Record objects");
    let all = helper.get_objects::<Record>(None)?;
    log_query_results(&all)?;

    log_section("get_objects for all Record objects in descending order of id");
    let ordered_by_id_desc = helper.get_objects::<Record>(Some(ORDER_BY_ID_DESC))?;
    log_query_results(&ordered_by_id_desc)?;

    log_section("get_objects for Record objects with value > 1.5");
    let filtered = helper.get_objects::<Record>(Some(VALUE_ABOVE))?;
    log_query_results(&filtered)?;

    log_section("get_objects for Record objects with value > 1.5 in descending order of date");
    let filtered_by_date_desc = helper.get_objects::<Record>(Some(VALUE_ABOVE_BY_DATE_DESC))?;
    log_query_results(&filtered_by_date_desc)?;

    log_section("get_object_by_id for id=2");
    let mut fetched = fetch(helper, 2)?;
    log_object(&fetched)?;
    let before_update = fetched.clone();

    fetched.flag = true;
    fetched.value = 2.22;
    helper.update(&fetched)?;

    log_section("get_object_by_id for id=2 after updating the object");
    let updated = fetch(helper, 2)?;
    log_object(&updated)?;

    log_section("deleting the object with id=2");
    helper.delete(&updated)?;

    log_section("get_objects for all Record objects");
    let remaining = helper.get_objects::<Record>(None)?;
    log_query_results(&remaining)?;

    Ok(DemoReport {
        cleared,
        all,
        ordered_by_id_desc,
        filtered,
        filtered_by_date_desc,
        fetched: before_update,
        updated,
        remaining,
    })
}

fn fetch(helper: &OrmHelper<'_>, id: i64) -> OrmResult<Record> {
    helper
        .get_object_by_id::<Record>(id)?
        .ok_or_else(|| OrmError::NotFound {
            class: Record::CLASS_NAME.to_string(),
            key: id.to_string(),
        })
}

fn date(text: &str) -> OrmResult<NaiveDate> {
    Ok(NaiveDate::parse_from_str(text, "%Y-%m-%d")?)
}
