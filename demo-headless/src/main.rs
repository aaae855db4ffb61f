use aeroevap_core::{solve, BulkTransferResult, Observation};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Open-water evaporation from one set of measurements
#[derive(Parser, Debug)]
#[command(name = "aeroevap-demo")]
#[command(about = "Aerodynamic bulk mass-transfer evaporation demo", long_about = None)]
struct Args {
    /// Wind speed in m/s
    #[arg(short, long, default_value_t = 0.597)]
    wind: f64,

    /// Air pressure in mb
    #[arg(short, long, default_value_t = 878.4)]
    pressure: f64,

    /// Air temperature in °C
    #[arg(long, default_value_t = 5.72)]
    air_temp: f64,

    /// Water skin temperature in °C
    #[arg(long, default_value_t = 5.424)]
    skin_temp: f64,

    /// Relative humidity in %
    #[arg(long, default_value_t = 91.1)]
    humidity: f64,

    /// Sensor height above the water in meters
    #[arg(long, default_value_t = 2.0)]
    sensor_height: f64,

    /// Timestep in seconds
    #[arg(short, long, default_value_t = 1800.0)]
    timestep: f64,

    /// Run the two reference scenarios instead
    #[arg(long)]
    reference: bool,
}

impl Args {
    fn observation(&self) -> Observation {
        Observation {
            timestamp: 0,
            wind_speed: self.wind,
            pressure: self.pressure,
            air_temperature: self.air_temp,
            skin_temperature: self.skin_temp,
            relative_humidity: self.humidity,
            sensor_height: self.sensor_height,
            timestep: self.timestep,
        }
    }
}

fn reference_scenarios() -> [(&'static str, Observation); 2] {
    [
        (
            "neutral (light wind, near-equal temperatures)",
            Observation {
                timestamp: 0,
                wind_speed: 0.597,
                pressure: 878.4,
                air_temperature: 5.72,
                skin_temperature: 5.424,
                relative_humidity: 91.1,
                sensor_height: 2.0,
                timestep: 1800.0,
            },
        ),
        (
            "unstable (strong wind over warm water, daily)",
            Observation {
                timestamp: 1,
                wind_speed: 11.766,
                pressure: 920.06,
                air_temperature: 0.4288,
                skin_temperature: 6.3593,
                relative_humidity: 82.22,
                sensor_height: 2.0,
                timestep: 86400.0,
            },
        ),
    ]
}

fn print_observation(obs: &Observation) {
    println!(
        "  Wind: {:.3} m/s, Pressure: {:.2} mb, Air: {:.4}°C, Skin: {:.4}°C, RH: {:.2}%",
        obs.wind_speed, obs.pressure, obs.air_temperature, obs.skin_temperature, obs.relative_humidity
    );
    println!(
        "  Sensor height: {:.2} m, Timestep: {:.0} s",
        obs.sensor_height, obs.timestep
    );
}

fn print_result(result: &BulkTransferResult) {
    match result.estimate() {
        Some(estimate) => {
            println!("  Regime:      {}", estimate.regime);
            println!("  E:           {:.6} mm/timestep", estimate.evaporation);
            println!("  Ce:          {:.6e}", estimate.transfer_coefficient);
            println!("  VPD:         {:.5} kPa", estimate.vapor_pressure_deficit);
            println!("  z/L:         {:.5}", estimate.stability);
        }
        None => println!("  No estimate: {:?}", result.status),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    println!("=== Open-Water Evaporation ===");

    if args.reference {
        for (label, obs) in reference_scenarios() {
            println!("\nScenario: {label}");
            print_observation(&obs);
            print_result(&obs.solve());
        }
        return;
    }

    let obs = args.observation();
    println!();
    print_observation(&obs);
    let result = solve(
        obs.wind_speed,
        obs.pressure,
        obs.air_temperature,
        obs.skin_temperature,
        obs.relative_humidity,
        obs.sensor_height,
        obs.timestep,
    );
    print_result(&result);
}
