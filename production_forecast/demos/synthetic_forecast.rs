use chrono::{Days, NaiveDate};
use production_forecast::{
    BrazilianHolidays, ForecastConfig, HistoricalFeatureBuilder, LinearModel, Observation,
    RollingForecaster,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two banks, two products, 120 days of noisy weekly-seasonal production
    let mut rng = StdRng::seed_from_u64(7);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let mut observations = Vec::new();

    for (bank, product, level) in [
        ("Itau", "Credit", 500.0),
        ("Itau", "Savings", 220.0),
        ("Bradesco", "Credit", 410.0),
        ("Bradesco", "Savings", 180.0),
    ] {
        for offset in 0..120u64 {
            let date = start + Days::new(offset);
            let weekly = if offset % 7 >= 5 { 0.4 } else { 1.0 };
            let noise: f64 = rng.gen_range(-0.1..0.1);
            let production = level * weekly * (1.0 + noise);
            observations.push(Observation::new(date, bank, product, production));
        }
    }
    println!("Generated {} observations", observations.len());

    let table = HistoricalFeatureBuilder::new(BrazilianHolidays).build(&observations)?;
    println!("Built {} featured rows", table.len());

    // Log-scale model leaning on the recent level and the weekend flag
    let model = LinearModel::new(
        vec![
            "rolling_mean_7".to_string(),
            "is_weekend".to_string(),
        ],
        vec![0.002, -0.9],
        (250.0f64).ln_1p(),
    )?;

    let config = ForecastConfig::with_horizon(14)?;
    let forecaster = RollingForecaster::new(model, BrazilianHolidays, config)?;
    let forecast = forecaster.forecast(&table)?;

    println!("Forecast for the next 14 days:");
    for record in forecast.records() {
        println!(
            "{} {:>9} {:>8} {:>10.2}",
            record.date, record.bank, record.product, record.prediction
        );
    }

    Ok(())
}
