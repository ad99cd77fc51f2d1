#![allow(dead_code)]

use phc_insights::constants::*;
use std::fs;
use std::path::Path;

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<&str>]) {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path).unwrap();
    writer.write_record(header).unwrap();
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.flush().unwrap();
}

pub fn write_service_delivery(dir: &Path) {
    let mut header = vec!["Name of Primary Health Center", "PHC LGA", "State of PHC"];
    header.extend_from_slice(SHORTAGE_COLUMNS);
    header.extend_from_slice(RATING_COLUMNS);
    header.push(REFERRALS_COLUMN);

    write_csv(
        &dir.join("service_delivery.csv"),
        &header,
        &[
            vec!["Ikeja PHC", " ikeja ", "Lagos State", "Yes", "Yes", "Yes", "Good", "Good", "Good", "10"],
            vec!["  IKEJA   phc. ", "", "", "Yes", "No", "No", "Very Good", "Very Good", "Very Good", "20"],
            vec!["Epe PHC", "Epe", "lagos", "No", "No", "No", "Excellent", "Excellent", "Excellent", "0"],
            vec!["", "Ikorodu", "Lagos", "Yes", "Yes", "Yes", "Poor", "Poor", "Poor", "5"],
            // wrong field count
            vec!["Broken PHC", "Epe"],
        ],
    );
}

pub fn write_infrastructure(dir: &Path) {
    let mut header = vec!["Primary Health Center", "LGA", "State"];
    header.extend_from_slice(BUILDING_FAILURE_COLUMNS);

    write_csv(
        &dir.join("infrastructure.csv"),
        &header,
        &[
            vec!["Ikeja PHC", "Ikeja", "Lagos", "Yes", "Broken", "No", "No"],
            vec!["Ojo PHC", "ojo", "Ogun", "No", "No", "No", "No"],
        ],
    );
}

pub fn write_inclusivity(dir: &Path) {
    write_csv(
        &dir.join("inclusivity.csv"),
        &["name", COMMUNITIES_COLUMN],
        &[
            vec!["Epe PHC", "About 12 communities"],
            vec!["Badagry PHC", "none"],
            vec!["Ojo PHC", "3"],
        ],
    );
}

pub fn write_telecommunication(dir: &Path) {
    write_csv(
        &dir.join("telecommunication.csv"),
        &["PHC Name", "LGA", "State", "Network Coverage and Transportation"],
        &[
            vec!["Ikeja PHC", "Ikeja", "Lagos", "4G, strong signal"],
            vec!["Epe PHC", "Epe", "Lagos", "2G, poor signal"],
            vec!["Ojo PHC", "Ojo", "Ogun", ""],
        ],
    );
}

pub fn write_all_sources(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    write_service_delivery(dir);
    write_infrastructure(dir);
    write_inclusivity(dir);
    write_telecommunication(dir);
}
