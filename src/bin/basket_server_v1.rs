use std::env;
use std::path::Path;

use actix_web::{web, App, HttpServer};
use log::info;

use basketd::http::basket_v1::{
    server::{process, status},
    AppState,
};
use basketd::input::prices::PriceTable;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let address: String = args[1].clone();
    let port: u16 = args[2].parse().unwrap();
    let prices_path = Path::new(&args[3]);

    //The process should not come up without a usable price table
    let prices = PriceTable::from_path(prices_path).unwrap();
    info!(
        "loaded price table: {} dates, {} symbols",
        prices.dates().len(),
        prices.symbols().len()
    );

    let app_state = web::Data::new(AppState::new(prices));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .service(status)
            .service(process)
    })
    .bind((address, port))?
    .run()
    .await
}
