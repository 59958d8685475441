use dismap_indicators::config::ProjectConfig;
use dismap_indicators::indicators::{compute_indicators, run_project, RunOptions};
use dismap_indicators::netcdf_io::read_auxiliary_grids;
use dismap_indicators::statistics::AuxDimension;
use dismap_indicators::table::{manifest_path, read_table, RunManifest};
use ndarray::{array, Array2};
use netcdf::create;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const FILL: f64 = -9999.0;

/// Writes 2-D `(y, x)` variables to a new NetCDF file
fn write_grids(path: &Path, grids: &[(&str, &Array2<f64>)], depth_positive: Option<&str>) {
    let (ny, nx) = grids[0].1.dim();
    let mut file = create(path).expect("Failed to create NetCDF file");
    file.add_dimension("y", ny).expect("Failed to add dimension y");
    file.add_dimension("x", nx).expect("Failed to add dimension x");

    for (name, grid) in grids {
        let mut var = file
            .add_variable::<f64>(name, &["y", "x"])
            .expect("Failed to add variable");
        var.put_attribute("_FillValue", FILL)
            .expect("Failed to add _FillValue");
        if *name == "depth" {
            if let Some(positive) = depth_positive {
                var.put_attribute("positive", positive)
                    .expect("Failed to add positive attribute");
            }
        }
        var.put(grid.view(), ..).expect("Failed to write data");
    }
}

/// 2 × 3 region straddling the antimeridian; the corner cell is land (fill value)
fn write_region(data_dir: &Path, code: &str) {
    let region_dir = data_dir.join(code);
    fs::create_dir_all(&region_dir).unwrap();

    let latitude = array![[52.0, 52.0, FILL], [51.0, 51.0, 51.0]];
    let longitude = array![[179.0, -179.0, FILL], [179.0, -179.0, -177.0]];
    // Stored as elevation, negative below sea level
    let depth = array![[-100.0, -200.0, FILL], [-300.0, -400.0, -500.0]];

    write_grids(
        &region_dir.join("auxiliary.nc"),
        &[("latitude", &latitude), ("longitude", &longitude), ("depth", &depth)],
        Some("up"),
    );
}

fn write_species_year(data_dir: &Path, code: &str, folder: &str, year: i32, biomass: &Array2<f64>) {
    let species_dir = data_dir.join(code).join("biomass").join(folder);
    fs::create_dir_all(&species_dir).unwrap();
    write_grids(
        &species_dir.join(format!("{folder}_{year}.nc")),
        &[("wtcpue", biomass)],
        None,
    );
}

fn project(regions: &str) -> ProjectConfig {
    ProjectConfig::from_json(&format!(
        r#"{{
            "regions": {regions},
            "species": {{
                "Gadus macrocephalus": {{"common_name": "Pacific cod", "core_species": true}}
            }}
        }}"#
    ))
    .expect("valid project")
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.map_or(false, |a| (a - b).abs() < 1e-9)
}

#[test]
fn auxiliary_grids_are_masked_and_depth_is_positive_down() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_region(dir.path(), "AI_IDW");

    let config = project(r#"[{"code": "AI_IDW"}]"#);
    let aux_path = dir.path().join("AI_IDW").join("auxiliary.nc");
    let aux = read_auxiliary_grids(&aux_path, &config.variables)
        .expect("Failed to read auxiliary grids");

    assert_eq!(aux.shape(), &[2, 3]);
    assert!(aux.latitude[[0, 2]].is_nan());
    assert_eq!(aux.depth[[0, 0]], 100.0);
    assert_eq!(aux.depth[[1, 2]], 500.0);
    assert_eq!(aux.grid(AuxDimension::Longitude)[[0, 1]], -179.0);
}

#[test]
fn region_run_produces_full_species_year_table() {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = dir.path().join("data");
    write_region(&data, "AI_IDW");

    // Pacific cod: split across the antimeridian in 2010, all in one cell in 2012
    let cod = "Gadus_macrocephalus";
    let cod_2010_grid = array![[1.0, 1.0, 0.0], [0.0, 0.0, 0.0]];
    let cod_2012_grid = array![[0.0, 0.0, 0.0], [4.0, 0.0, 0.0]];
    write_species_year(&data, "AI_IDW", cod, 2010, &cod_2010_grid);
    write_species_year(&data, "AI_IDW", cod, 2012, &cod_2012_grid);
    // Halibut: nothing caught in 2010, present in 2012
    let halibut = "Hippoglossus_stenolepis";
    let halibut_2012_grid = array![[0.0, 0.0, 0.0], [0.0, 1.0, 3.0]];
    write_species_year(&data, "AI_IDW", halibut, 2010, &Array2::zeros((2, 3)));
    write_species_year(&data, "AI_IDW", halibut, 2012, &halibut_2012_grid);

    let config = project(r#"[{"code": "AI_IDW", "name": "Aleutian Islands"}]"#);
    let output = dir.path().join("indicators.csv");
    let manifest = run_project(&config, &data, &output, &RunOptions::default())
        .expect("Failed to run project");

    assert_eq!(manifest.rows_written, 4);
    assert_eq!(manifest.regions_completed, vec!["AI_IDW"]);
    assert_eq!(manifest.halted_region, None);

    let rows = read_table(&output).expect("Failed to read table");
    let keys: Vec<(&str, i32)> = rows.iter().map(|r| (r.species.as_str(), r.year)).collect();
    assert_eq!(
        keys,
        vec![
            ("Gadus macrocephalus", 2010),
            ("Gadus macrocephalus", 2012),
            ("Hippoglossus stenolepis", 2010),
            ("Hippoglossus stenolepis", 2012),
        ]
    );

    let cod_2010 = &rows[0];
    assert_eq!(cod_2010.region, "Aleutian Islands");
    assert_eq!(cod_2010.common_name, "Pacific cod");
    assert!(cod_2010.core_species);
    assert!(close(cod_2010.center_of_gravity_latitude, 52.0));
    assert!(close(cod_2010.center_of_gravity_longitude, -180.0));
    assert!(close(cod_2010.minimum_longitude, 179.0));
    assert!(close(cod_2010.maximum_longitude, -179.0));
    assert!(close(cod_2010.center_of_gravity_depth, 150.0));
    assert!(close(cod_2010.offset_depth, 0.0));

    let cod_2012 = &rows[1];
    assert!(close(cod_2012.center_of_gravity_latitude, 51.0));
    assert!(close(cod_2012.offset_latitude, -1.0));
    assert!(close(cod_2012.center_of_gravity_depth, 300.0));
    assert!(close(cod_2012.offset_depth, 150.0));
    assert!(close(cod_2012.center_of_gravity_latitude_se, 0.0));
    // One degree west of the 2010 centroid, not 359 degrees east
    assert!(close(cod_2012.center_of_gravity_longitude, 179.0));
    assert!(close(cod_2012.offset_longitude, -1.0));

    // Not in the dictionary, missing in 2010: derived flag is "not core"
    let halibut_2010 = &rows[2];
    assert!(halibut_2010.is_null());
    assert!(!halibut_2010.core_species);
    assert_eq!(halibut_2010.common_name, "");

    let halibut_2012 = &rows[3];
    assert!(close(halibut_2012.center_of_gravity_longitude, -177.5));
    assert!(close(halibut_2012.minimum_longitude, -179.0));
    assert!(close(halibut_2012.maximum_longitude, -177.0));
    assert!(close(halibut_2012.offset_longitude, 0.0));
    assert!(close(halibut_2012.center_of_gravity_depth, 475.0));

    let written: RunManifest =
        serde_json::from_str(&fs::read_to_string(manifest_path(&output)).unwrap()).unwrap();
    assert_eq!(written, manifest);
}

#[test]
fn biomass_over_a_depth_gap_counts_towards_the_depth_total() {
    let dir = tempdir().expect("Failed to create temp dir");
    let region_dir = dir.path().join("NBS_IDW");
    fs::create_dir_all(&region_dir).unwrap();

    // Latitude and longitude cover every cell; depth has one bathymetry gap
    let latitude = array![[50.0, 50.0], [51.0, 51.0]];
    let longitude = array![[-170.0, -169.0], [-170.0, -169.0]];
    let depth = array![[100.0, FILL], [300.0, 400.0]];
    write_grids(
        &region_dir.join("auxiliary.nc"),
        &[("latitude", &latitude), ("longitude", &longitude), ("depth", &depth)],
        None,
    );
    write_species_year(
        dir.path(),
        "NBS_IDW",
        "Gadus_macrocephalus",
        2010,
        &array![[1.0, 1.0], [0.0, 2.0]],
    );

    let config = project(r#"[{"code": "NBS_IDW"}]"#);
    let summary = compute_indicators(&config, dir.path(), &RunOptions::default()).unwrap();
    let row = &summary.rows[0];

    assert!(close(row.center_of_gravity_latitude, 50.5));
    assert!(close(row.center_of_gravity_longitude, -169.25));
    // (1 × 100 + 2 × 400) / 4: the gap cell's biomass stays in the total
    assert!(close(row.center_of_gravity_depth, 225.0));
    assert!(close(row.minimum_depth, 100.0));
    assert!(close(row.maximum_depth, 400.0));
    // Weighted products 100 and 800 over two cells
    assert!(close(row.center_of_gravity_depth_se, 350.0 / 2.0_f64.sqrt()));
}

#[test]
fn missing_biomass_folder_stops_remaining_regions() {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = dir.path();
    for code in ["AI_IDW", "EBS_IDW", "GOA_IDW"] {
        write_region(data, code);
    }
    let biomass = array![[1.0, 0.0, 0.0], [0.0, 0.0, 0.0]];
    write_species_year(data, "AI_IDW", "Gadus_macrocephalus", 2010, &biomass);
    write_species_year(data, "GOA_IDW", "Gadus_macrocephalus", 2010, &biomass);

    let config = project(r#"[{"code": "AI_IDW"}, {"code": "EBS_IDW"}, {"code": "GOA_IDW"}]"#);

    let halted = compute_indicators(&config, data, &RunOptions::default()).unwrap();
    assert_eq!(halted.regions_completed, vec!["AI_IDW"]);
    assert_eq!(halted.halted_region.as_deref(), Some("EBS_IDW"));
    assert_eq!(halted.rows.len(), 1);

    let options = RunOptions {
        continue_on_missing: true,
        ..RunOptions::default()
    };
    let skipped = compute_indicators(&config, data, &options).unwrap();
    assert_eq!(skipped.regions_completed, vec!["AI_IDW", "GOA_IDW"]);
    assert_eq!(skipped.regions_skipped, vec!["EBS_IDW"]);
    assert_eq!(skipped.rows.len(), 2);
}

#[test]
fn appending_the_same_run_does_not_duplicate_rows() {
    let dir = tempdir().expect("Failed to create temp dir");
    let data = dir.path().join("data");
    write_region(&data, "AI_IDW");
    let biomass = array![[1.0, 2.0, 0.0], [3.0, 0.0, 0.0]];
    write_species_year(&data, "AI_IDW", "Gadus_macrocephalus", 2010, &biomass);

    let config = project(r#"[{"code": "AI_IDW"}]"#);
    let output = dir.path().join("indicators.csv");
    let options = RunOptions {
        append: true,
        ..RunOptions::default()
    };

    let first = run_project(&config, &data, &output, &options).unwrap();
    assert_eq!(first.rows_written, 1);

    let second = run_project(&config, &data, &output, &options).unwrap();
    assert_eq!(second.rows_computed, 1);
    assert_eq!(second.duplicates_removed, 1);
    assert_eq!(second.rows_written, 1);
    assert_eq!(read_table(&output).unwrap().len(), 1);
}

#[test]
fn biomass_grid_with_wrong_shape_is_an_error() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_region(dir.path(), "AI_IDW");
    write_species_year(dir.path(), "AI_IDW", "Gadus_macrocephalus", 2010, &Array2::ones((3, 3)));

    let config = project(r#"[{"code": "AI_IDW"}]"#);
    let result = compute_indicators(&config, dir.path(), &RunOptions::default());
    assert!(matches!(
        result,
        Err(dismap_indicators::DisMapError::GridShapeMismatch { .. })
    ));
}
