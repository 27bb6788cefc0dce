//! Text rendering of the dashboard panels.

use skywatcher_core::{Dashboard, LocationPanel};

/// Render the location panel: exactly one of spinner text, error with retry
/// hint, data grid, or an empty placeholder.
pub fn location_panel(dash: &Dashboard) {
    match dash.location_panel() {
        LocationPanel::Loading => println!("Fetching your location weather..."),
        LocationPanel::Error(message) => {
            println!("Warning: {message}");
            println!("Run `skywatcher locate` to retry.");
        }
        LocationPanel::Data(view) => {
            println!("Current Location: {}, {}", view.name, view.country);
            println!("  Temperature: {:.0}°C", view.temp_c);
            println!("  Condition:   {}", view.condition);
            println!("  Humidity:    {}%", view.humidity_pct);
            println!("  Wind Speed:  {} km/h", view.wind_speed);
        }
        LocationPanel::Empty => println!("No location weather yet."),
    }
}

/// Render the searched-city panel: header line, condition and sun times,
/// the three stat cards, and the six-hour strip.
pub fn search_results(dash: &Dashboard) {
    let Some(view) = dash.weather() else {
        return;
    };

    println!("{} {} {}", view.name, view.region, view.country);
    println!("  {}", view.condition);
    println!("  {}  |  {}", view.sunrise, view.sunset);
    println!("  Temperature: {}", view.temp);
    println!("  Wind Speed:  {}", view.wind);
    println!("  Humidity:    {}", view.humidity);

    println!("Upcoming Hours");
    for entry in dash.forecast() {
        println!("  {}  {}", entry.time, entry.temp);
    }
}
