//! FLUXNET metadata condensation over a realistic long-format file.

use clima_fetch::fluxnet;

const INPUT: &str = "\
SITE_ID,GROUP_ID,VARIABLE_GROUP,VARIABLE,DATAVALUE
AT-Neu,1,GRP_LOCATION,LOCATION_LAT,47.1167
AT-Neu,1,GRP_LOCATION,LOCATION_LONG,11.3175
AT-Neu,2,GRP_UTC_OFFSET,UTC_OFFSET,1
AT-Neu,3,GRP_HEIGHTC,HEIGHTC,0.2
AT-Neu,4,GRP_HEIGHTC,HEIGHTC,0.4
AT-Neu,5,GRP_VAR_INFO,VAR_INFO_VARNAME,CO2_F_MDS
AT-Neu,5,GRP_VAR_INFO,VAR_INFO_HEIGHT,2.5
AT-Neu,6,GRP_VAR_INFO,VAR_INFO_VARNAME,SWC_F_MDS_1
AT-Neu,6,GRP_VAR_INFO,VAR_INFO_HEIGHT,-0.05
AT-Neu,7,GRP_VAR_INFO,VAR_INFO_VARNAME,TS_F_MDS_1
AT-Neu,7,GRP_VAR_INFO,VAR_INFO_HEIGHT,-0.02
US-Ha1,1,GRP_LOCATION,LOCATION_LAT,42.5378
US-Ha1,1,GRP_LOCATION,LOCATION_LONG,-72.1715
US-Ha1,2,GRP_UTC_OFFSET,UTC_OFFSET,-5
";

#[test]
fn condenses_to_one_row_per_site() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("metadata.csv");
    let output = dir.path().join("out/sites.csv");
    std::fs::write(&input, INPUT).unwrap();

    fluxnet::process_metadata(&input, &output).unwrap();

    let contents = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines[0],
        "site_id,latitude,longitude,utc_offset,canopy_height,\
         atmospheric_sensor_heights,swc_depths,ts_depths"
    );
    assert_eq!(lines.len(), 3);

    // canopy height is the mean of the two HEIGHTC rows; whole floats such
    // as the UTC offsets keep their trailing .0
    assert_eq!(lines[1], "AT-Neu,47.1167,11.3175,1.0,0.30000000000000004,2.5,-0.05,-0.02");
    // a site with no sensor metadata gets empty heights and NaN depths
    assert_eq!(lines[2], "US-Ha1,42.5378,-72.1715,-5.0,,,NaN,NaN");
}
