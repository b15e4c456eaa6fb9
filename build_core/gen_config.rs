//! Validate the parsed configuration and emit `const BUILD_CONFIG: NodeConfig`.
use super::domain::*;
use super::errors::*;

use std::fmt::Write;

/// Check every range constraint, then render the Rust constant.
pub(crate) fn run_config_gen(config: &NodeConfigFile) -> Result<String, BuildError> {
    validate(config)?;

    let mut buffer = String::new();
    writeln!(
        buffer,
        "/// Configuration baked in at build time from the node configuration file."
    )?;
    writeln!(buffer, "pub const BUILD_CONFIG: NodeConfig = NodeConfig {{")?;

    let bus = &config.bus;
    writeln!(buffer, "    bus: BusConfig {{")?;
    writeln!(buffer, "        clock_khz: {},", bus.clock_khz)?;
    writeln!(buffer, "        sda_pin: {},", bus.sda_pin)?;
    writeln!(buffer, "        scl_pin: {},", bus.scl_pin)?;
    writeln!(buffer, "    }},")?;

    let sensor = &config.sensor;
    writeln!(buffer, "    sensor: SensorConfig {{")?;
    writeln!(buffer, "        address: {:#04X},", sensor.address)?;
    writeln!(buffer, "        max_busy_retries: {},", sensor.max_busy_retries)?;
    writeln!(
        buffer,
        "        max_checksum_retries: {},",
        sensor.max_checksum_retries
    )?;
    writeln!(buffer, "        reset_settle_ms: {},", sensor.reset_settle_ms)?;
    writeln!(
        buffer,
        "        temperature_settle_ms: {},",
        sensor.temperature_settle_ms
    )?;
    writeln!(
        buffer,
        "        humidity_settle_ms: {},",
        sensor.humidity_settle_ms
    )?;
    writeln!(buffer, "    }},")?;

    // `{:?}` on a `String` yields an escaped Rust string literal.
    let link = &config.link;
    writeln!(buffer, "    link: LinkConfig {{")?;
    writeln!(buffer, "        ssid: {:?},", link.ssid)?;
    writeln!(buffer, "        password: {:?},", link.password)?;
    writeln!(
        buffer,
        "        max_reconnect_attempts: {},",
        link.max_reconnect_attempts
    )?;
    writeln!(buffer, "        connect_timeout_ms: {},", link.connect_timeout_ms)?;
    writeln!(buffer, "    }},")?;

    let broker = &config.broker;
    writeln!(buffer, "    broker: BrokerConfig {{")?;
    writeln!(buffer, "        uri: {:?},", broker.uri)?;
    writeln!(buffer, "        username: {:?},", broker.username)?;
    writeln!(buffer, "        password: {:?},", broker.password)?;
    writeln!(buffer, "        topic_prefix: {:?},", broker.topic_prefix)?;
    writeln!(buffer, "        qos: {},", qos_variant(broker.qos)?)?;
    writeln!(
        buffer,
        "        connect_timeout_ms: {},",
        broker.connect_timeout_ms
    )?;
    writeln!(buffer, "    }},")?;

    let schedule = &config.schedule;
    writeln!(buffer, "    schedule: ScheduleConfig {{")?;
    writeln!(
        buffer,
        "        wake_period_minutes: {},",
        schedule.wake_period_minutes
    )?;
    writeln!(buffer, "        min_sleep_ms: {},", schedule.min_sleep_ms)?;
    writeln!(buffer, "    }},")?;

    writeln!(
        buffer,
        "    restart_countdown_secs: {},",
        config.restart_countdown_secs
    )?;
    writeln!(buffer, "}};")?;

    Ok(buffer)
}

fn validate(config: &NodeConfigFile) -> Result<(), BuildError> {
    if config.sensor.address > 0x7F {
        return Err(BuildError::InvalidValue {
            field: "sensor.address",
            comment: "must be a 7-bit address",
        });
    }
    if config.sensor.max_busy_retries == 0 || config.sensor.max_checksum_retries == 0 {
        return Err(BuildError::InvalidValue {
            field: "sensor.max_*_retries",
            comment: "at least one attempt is required",
        });
    }
    if config.link.ssid.is_empty() {
        return Err(BuildError::InvalidValue {
            field: "link.ssid",
            comment: "must not be empty",
        });
    }
    if config.link.connect_timeout_ms == 0 || config.broker.connect_timeout_ms == 0 {
        return Err(BuildError::InvalidValue {
            field: "*.connect_timeout_ms",
            comment: "connect waits need a finite, non-zero deadline",
        });
    }
    if config.broker.topic_prefix.is_empty() || config.broker.topic_prefix.ends_with('/') {
        return Err(BuildError::InvalidValue {
            field: "broker.topic_prefix",
            comment: "must be non-empty without a trailing '/'",
        });
    }
    if config.schedule.wake_period_minutes == 0 {
        return Err(BuildError::InvalidValue {
            field: "schedule.wake_period_minutes",
            comment: "must be at least one minute",
        });
    }
    if config.schedule.min_sleep_ms as u64 > config.schedule.wake_period_minutes as u64 * 60_000 {
        return Err(BuildError::InvalidValue {
            field: "schedule.min_sleep_ms",
            comment: "must not exceed the wake period",
        });
    }
    Ok(())
}

fn qos_variant(qos: u8) -> Result<&'static str, BuildError> {
    match qos {
        0 => Ok("QoS::AtMostOnce"),
        1 => Ok("QoS::AtLeastOnce"),
        2 => Ok("QoS::ExactlyOnce"),
        _ => Err(BuildError::InvalidValue {
            field: "broker.qos",
            comment: "must be 0, 1 or 2",
        }),
    }
}
