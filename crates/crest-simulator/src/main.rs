//! Desktop simulator for the CREST datalogger sampling pipeline.
//!
//! Feeds synthetic ADC readings through a [`SampleAccumulator`] and prints the
//! CSV lines the SD card layer would write. Upload batches are logged instead
//! of sent.
//!
//! ```text
//! RUST_LOG=debug cargo run -p crest-simulator -- 120
//! ```
//!
//! The optional argument is the number of simulated seconds (default 60).

use std::process::ExitCode;

use log::{error, info};

use crest_datalogger::config::debug_fields_from_list;
use crest_datalogger::conversion::linkit_one_field_setup;
use crest_datalogger::{DataChannelSettings, DataConfig, SampleAccumulator};

/// Settings file contents for the simulated board
const CHANNEL_SETTINGS: &str = "
# Battery voltage through a 10k/2k divider
Channel1.type = voltage
Channel1.mvperbit = 0.125
Channel1.r1 = 10000
Channel1.r2 = 2000

# Panel current
Channel2.type = current
Channel2.mvperbit = 0.125
Channel2.offset = 600
Channel2.mvperamp = 60

# Enclosure temperature
Channel3.type = thermistor
Channel3.maxadc = 1023
Channel3.b = 3977
Channel3.r25 = 10000
Channel3.otherr = 10000
Channel3.highside = false
";

const DEFAULT_RUN_SECS: u32 = 60;

// ---------------------------------------------------------------------------
// Mock data generation
// ---------------------------------------------------------------------------

/// Generates synthetic raw ADC readings that vary over time.
struct MockAdc {
    elapsed_secs: f64,
}

impl MockAdc {
    fn new() -> Self {
        Self { elapsed_secs: 0.0 }
    }

    /// Advance the clock and return one reading per channel.
    fn next_readings(&mut self, dt_secs: f64) -> [i32; 3] {
        self.elapsed_secs += dt_secs;
        let t = self.elapsed_secs;

        // Battery: 12.2-13.0 V
        let volts = 12.6 + 0.4 * (t / 90.0).sin();
        let battery = volts / 6.0 * 1000.0 / 0.125;

        // Panel current: 0-3 A with some ripple
        let amps = 1.5 + 1.5 * (t / 45.0).sin() + 0.05 * (t * 3.0).cos();
        let current = (amps * 60.0 + 600.0) / 0.125;

        // Thermistor around mid-scale (25 C)
        let thermistor = 511.5 + 40.0 * (t / 120.0).cos();

        [battery as i32, current as i32, thermistor as i32]
    }
}

fn run(run_secs: u32) -> Result<(), crest_datalogger::DataError> {
    let config = DataConfig {
        values_per_second: 4,
        storage_averaging_interval_secs: 5,
        upload_averaging_interval_secs: 10,
        storage_interval_secs: 10,
        upload_interval_secs: 30,
        enable_data_debug: true,
        debug_fields: debug_fields_from_list("01, 03"),
    };

    let settings = DataChannelSettings::from_lines(CHANNEL_SETTINGS);
    let mut accumulator =
        SampleAccumulator::with_field_setup(config, &settings, linkit_one_field_setup)?;

    let mut header = vec![0u8; 256];
    let len = accumulator.write_headers_to_buffer(&mut header);
    print!("{}", String::from_utf8_lossy(&header[..len]));

    let mut adc = MockAdc::new();
    let mut upload_batch = String::with_capacity(accumulator.upload_buffer_size());
    let mut upload_row = vec![0.0f32; accumulator.field_count()];
    let sample_period = 1.0 / f64::from(config.values_per_second);

    for _ in 0..run_secs * config.values_per_second {
        let event = accumulator.new_data_array(&adc.next_readings(sample_period));

        if event.debug {
            accumulator.drain_debug();
        }

        if event.storage {
            let mut line = String::new();
            while accumulator.write_storage_row(&mut line)? {
                print!("{line}");
                line.clear();
            }
        }

        let averages = accumulator.number_of_averages_for_upload() as usize;
        if event.upload && accumulator.upload_data_remaining() >= averages {
            accumulator.set_upload_pending(true);
        }

        if accumulator.upload_pending() {
            upload_batch.clear();
            while accumulator.take_upload_data(&mut upload_row) > 0 {
                let values: Vec<String> = upload_row.iter().map(|v| format!("{v:.3}")).collect();
                upload_batch.push_str(&values.join(","));
                upload_batch.push('|');
            }
            info!(
                "Upload channels {:?}: {}",
                accumulator.channel_numbers(),
                upload_batch
            );
            accumulator.set_upload_pending(false);
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(env).init();

    let run_secs = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_RUN_SECS);

    info!("Simulating {} seconds of sampling", run_secs);
    match run(run_secs) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Setup failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
