use chrono::{Local, NaiveDateTime};

const LOCAL_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn local_timestamp_str() -> String {
    datetime_to_str(local_now())
}

pub fn datetime_to_str(date: NaiveDateTime) -> String {
    date.format(LOCAL_TIMESTAMP_FORMAT).to_string()
}
