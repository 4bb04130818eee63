// crates/kernel/src/resume/json.rs
use std::path::PathBuf;
use std::time::Duration;

use filters::FilterDef;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::{
    Behaviors, ConcurrencyOptions, HibernationOptions, SessionOptions, Subscription,
};

/// A projected field did not match its live counterpart.
///
/// `UnequalValue` means both sides carry the field but the values differ;
/// `UnequalPtr` means exactly one side carries an optional field at all.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EquivalenceError {
    /// Field present on both sides with different values.
    #[error("unequal value for field '{field}': expected '{expected}', actual '{actual}'")]
    UnequalValue {
        /// Wire name of the offending field.
        field: &'static str,
        /// Value on the live side.
        expected: String,
        /// Value on the projected side.
        actual: String,
    },
    /// Optional field present on only one side.
    #[error("unequal pointer for field '{field}': present on one side only")]
    UnequalPtr {
        /// Wire name of the offending field.
        field: &'static str,
    },
}

/// JSON-safe projection of the sampling window.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonSampling {
    /// File window size, absent when files are unsampled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<u64>,
    /// Folder window size, absent when folders are unsampled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folders: Option<u64>,
    /// Whether the window is taken from the tail.
    #[serde(rename = "in-reverse", default)]
    pub in_reverse: bool,
}

/// JSON-safe projection of the hibernation configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JsonHibernation {
    /// Wake filter definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wake: Option<FilterDef>,
    /// Sleep filter definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep: Option<FilterDef>,
    /// Inclusive-wake flag.
    #[serde(rename = "inclusive-wake", default = "default_inclusive")]
    pub inclusive_wake: bool,
    /// Inclusive-sleep flag.
    #[serde(rename = "inclusive-sleep", default)]
    pub inclusive_sleep: bool,
}

const fn default_inclusive() -> bool {
    true
}

impl Default for JsonHibernation {
    fn default() -> Self {
        Self {
            wake: None,
            sleep: None,
            inclusive_wake: default_inclusive(),
            inclusive_sleep: false,
        }
    }
}

/// JSON-safe projection of the worker-pool parameters.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct JsonConcurrency {
    /// Worker thread count.
    pub workers: u64,
    /// Bounded channel capacity.
    #[serde(rename = "queue-capacity")]
    pub queue_capacity: u64,
    /// Result send timeout in milliseconds.
    #[serde(rename = "send-timeout-ms")]
    pub send_timeout_ms: u64,
}

/// JSON-safe projection of [`SessionOptions`].
///
/// Same field set as the live model under serialization-friendly container
/// types; paths become strings and durations become millisecond counts.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JsonOptions {
    /// Callback subscription.
    pub subscription: Subscription,
    /// Snapshot-on-abort flag.
    #[serde(rename = "save-on-abort", default)]
    pub save_on_abort: bool,
    /// Sampling window.
    pub sampling: JsonSampling,
    /// Node-level client filter.
    #[serde(rename = "node-filter", default, skip_serializing_if = "Option::is_none")]
    pub node_filter: Option<FilterDef>,
    /// Child-listing filter.
    #[serde(rename = "child-filter", default, skip_serializing_if = "Option::is_none")]
    pub child_filter: Option<FilterDef>,
    /// Hibernation configuration.
    #[serde(default)]
    pub hibernation: JsonHibernation,
    /// Worker-pool parameters.
    pub concurrency: JsonConcurrency,
    /// Snapshot destination path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

/// Projects live options into the JSON shape.
#[must_use]
pub fn project(options: &SessionOptions) -> JsonOptions {
    JsonOptions {
        subscription: options.subscription,
        save_on_abort: options.behaviors.save_on_abort,
        sampling: JsonSampling {
            files: options.sampling.files.map(|n| n as u64),
            folders: options.sampling.folders.map(|n| n as u64),
            in_reverse: options.sampling.in_reverse,
        },
        node_filter: options.node_filter.clone(),
        child_filter: options.child_filter.clone(),
        hibernation: JsonHibernation {
            wake: options.hibernation.wake.clone(),
            sleep: options.hibernation.sleep.clone(),
            inclusive_wake: options.hibernation.inclusive_wake,
            inclusive_sleep: options.hibernation.inclusive_sleep,
        },
        concurrency: JsonConcurrency {
            workers: options.concurrency.workers as u64,
            queue_capacity: options.concurrency.queue_capacity as u64,
            send_timeout_ms: u64::try_from(options.concurrency.send_timeout.as_millis())
                .unwrap_or(u64::MAX),
        },
        snapshot: options
            .snapshot
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned()),
    }
}

/// Restores live options from a loaded projection.
#[must_use]
pub fn restore(json: &JsonOptions) -> SessionOptions {
    SessionOptions {
        subscription: json.subscription,
        behaviors: Behaviors {
            save_on_abort: json.save_on_abort,
        },
        sampling: filters::SampleSpec {
            files: json.sampling.files.map(|n| n as usize),
            folders: json.sampling.folders.map(|n| n as usize),
            in_reverse: json.sampling.in_reverse,
        },
        node_filter: json.node_filter.clone(),
        child_filter: json.child_filter.clone(),
        hibernation: HibernationOptions {
            wake: json.hibernation.wake.clone(),
            sleep: json.hibernation.sleep.clone(),
            inclusive_wake: json.hibernation.inclusive_wake,
            inclusive_sleep: json.hibernation.inclusive_sleep,
        },
        concurrency: ConcurrencyOptions {
            workers: json.concurrency.workers as usize,
            queue_capacity: json.concurrency.queue_capacity as usize,
            send_timeout: Duration::from_millis(json.concurrency.send_timeout_ms),
        },
        snapshot: json.snapshot.as_ref().map(PathBuf::from),
    }
}

fn check_value<T: PartialEq + std::fmt::Debug>(
    field: &'static str,
    expected: &T,
    actual: &T,
) -> Result<(), EquivalenceError> {
    if expected == actual {
        Ok(())
    } else {
        Err(EquivalenceError::UnequalValue {
            field,
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        })
    }
}

fn check_option<T: PartialEq + std::fmt::Debug>(
    field: &'static str,
    expected: Option<&T>,
    actual: Option<&T>,
) -> Result<(), EquivalenceError> {
    match (expected, actual) {
        (None, None) => Ok(()),
        (Some(expected), Some(actual)) => check_value(field, expected, actual),
        _ => Err(EquivalenceError::UnequalPtr { field }),
    }
}

/// Verifies that a projection mirrors the live options field by field.
///
/// The first mismatch aborts the check and names the offending field.
pub fn equivalent(options: &SessionOptions, json: &JsonOptions) -> Result<(), EquivalenceError> {
    check_value("subscription", &options.subscription, &json.subscription)?;
    check_value(
        "save-on-abort",
        &options.behaviors.save_on_abort,
        &json.save_on_abort,
    )?;
    check_option(
        "sampling.files",
        options.sampling.files.map(|n| n as u64).as_ref(),
        json.sampling.files.as_ref(),
    )?;
    check_option(
        "sampling.folders",
        options.sampling.folders.map(|n| n as u64).as_ref(),
        json.sampling.folders.as_ref(),
    )?;
    check_value(
        "sampling.in-reverse",
        &options.sampling.in_reverse,
        &json.sampling.in_reverse,
    )?;
    check_option(
        "node-filter",
        options.node_filter.as_ref(),
        json.node_filter.as_ref(),
    )?;
    check_option(
        "child-filter",
        options.child_filter.as_ref(),
        json.child_filter.as_ref(),
    )?;
    check_option(
        "hibernation.wake",
        options.hibernation.wake.as_ref(),
        json.hibernation.wake.as_ref(),
    )?;
    check_option(
        "hibernation.sleep",
        options.hibernation.sleep.as_ref(),
        json.hibernation.sleep.as_ref(),
    )?;
    check_value(
        "hibernation.inclusive-wake",
        &options.hibernation.inclusive_wake,
        &json.hibernation.inclusive_wake,
    )?;
    check_value(
        "hibernation.inclusive-sleep",
        &options.hibernation.inclusive_sleep,
        &json.hibernation.inclusive_sleep,
    )?;
    check_value(
        "concurrency.workers",
        &(options.concurrency.workers as u64),
        &json.concurrency.workers,
    )?;
    check_value(
        "concurrency.queue-capacity",
        &(options.concurrency.queue_capacity as u64),
        &json.concurrency.queue_capacity,
    )?;
    check_value(
        "concurrency.send-timeout-ms",
        &u64::try_from(options.concurrency.send_timeout.as_millis()).unwrap_or(u64::MAX),
        &json.concurrency.send_timeout_ms,
    )?;
    check_option(
        "snapshot",
        options
            .snapshot
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .as_ref(),
        json.snapshot.as_ref(),
    )?;
    Ok(())
}
