use banfetch::{default_progress_fn, extract_archive, fetch_if_stale, Api, FetchConfig};

fn main() {
    env_logger::init();

    // Two stages driven by hand
    let config = FetchConfig::new("./data");
    if fetch_if_stale(&config, Some(default_progress_fn())) {
        if extract_archive(&config, Some(default_progress_fn())) {
            println!("BAN extracted into {}", config.extract_dir().display());
        } else {
            eprintln!("BAN downloaded but could not be extracted");
        }
    }

    // Same workflow through the builder, extracting elsewhere
    let result = Api::new()
        .set_data_dir("./data-mirror")
        .set_extract_dir("./data-mirror/csv")
        .update();

    match result {
        Ok(status) => println!("mirror: {status:?}"),
        Err(e) => eprintln!("error updating mirror: {e}"),
    }
}
