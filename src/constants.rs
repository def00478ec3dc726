//! Fixed lookup tables and source locations.

pub const DATA_PATH: &str =
    "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series";
pub const CASES_CSV: &str = "time_series_covid19_confirmed_global.csv";
pub const DEATHS_CSV: &str = "time_series_covid19_deaths_global.csv";
pub const POP_CSV: &str =
    "https://raw.githubusercontent.com/datasets/population/master/data/population.csv";
pub const PROV_POP_CSV: &str = "https://www12.statcan.gc.ca/census-recensement/2016/dp-pd/hlt-fst/pd-pl/Tables/File.cfm?T=101&SR=1&RPP=25&PR=0&CMA=0&CSD=0&S=50&O=A&Lang=Eng&OFT=CSV";

pub const PROVINCE_COLUMN: &str = "Province/State";
pub const COUNTRY_COLUMN: &str = "Country/Region";
pub const LAT_COLUMN: &str = "Lat";
pub const LONG_COLUMN: &str = "Long";

/// Country whose subdivisions get their own chart.
pub const PROVINCE_COUNTRY: &str = "Canada";

/// JHU CSSE labels mapped to the names used everywhere else.
pub static RENAME: &[(&str, &str)] = &[
    ("US", "United States"),
    ("Taiwan*", "Taiwan"),
    ("Korea, South", "South Korea"),
];

/// Subdivision labels that are not places.
pub static NON_STATES: &[&str] = &["Recovered"];

/// World Bank country names mapped onto the JHU CSSE names.
pub static POP_RENAME: &[(&str, &str)] = &[
    ("Korea, Rep.", "South Korea"),
    ("Iran, Islamic Rep.", "Iran"),
    ("Russian Federation", "Russia"),
    ("Congo, Dem. Rep.", "Congo (Kinshasa)"),
    ("Congo, Rep.", "Congo (Brazzaville)"),
    ("Egypt, Arab Rep.", "Egypt"),
    ("Czech Republic", "Czechia"),
    ("Slovak Republic", "Slovakia"),
    ("Venezuela, RB", "Venezuela"),
    ("Syrian Arab Republic", "Syria"),
    ("Lao PDR", "Laos"),
    ("Kyrgyz Republic", "Kyrgyzstan"),
    ("Brunei Darussalam", "Brunei"),
    ("Gambia, The", "Gambia"),
    ("Bahamas, The", "Bahamas"),
    ("Yemen, Rep.", "Yemen"),
];

/// Taiwan is absent from the World Bank table.
pub const TAIWAN_POPULATION: f64 = 23.78e6;
pub const TAIWAN_CODE: &str = "TW";

/// Standard Geographical Classification codes of the provinces and territories.
pub static SGC_CODES: &[(u32, &str)] = &[
    (10, "NL"),
    (11, "PE"),
    (12, "NS"),
    (13, "NB"),
    (24, "QC"),
    (35, "ON"),
    (46, "MB"),
    (47, "SK"),
    (48, "AB"),
    (59, "BC"),
    (60, "YT"),
    (61, "NT"),
    (62, "NU"),
];

/// Default country groups, one chart each.
pub static PLOT_COUNTRIES: &[&[&str]] = &[
    &[
        "China",
        "South Korea",
        "Italy",
        "Iran",
        "United States",
        "Canada",
        "Taiwan",
        "Singapore",
    ],
    &[
        "China",
        "Italy",
        "Spain",
        "France",
        "United Kingdom",
        "Sweden",
        "Canada",
        "Russia",
    ],
    &[
        "China",
        "South Korea",
        "Italy",
        "Spain",
        "United States",
        "Canada",
        "Russia",
        "Brazil",
    ],
];

pub const PROVINCE_COUNT: usize = 8;
pub const ROLLING_WINDOW: usize = 7;
pub static REFERENCE_RATES: &[f64] = &[0.1, 0.4];

pub const DPI: u32 = 96;
/// Figure size in inches.
pub const FIGURE_SIZE: (f64, f64) = (8.5, 4.5);

/// Days shown before the latest province event.
pub const PROVINCE_LEAD_DAYS: i64 = 30;

pub const AS_OF_SOURCE: &str = "Johns Hopkins CSSE COVID-19 data";

pub static FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Policy responses, columns right-aligned to their header.
pub const EVENTS: &str = r"
         country                         event        date arrow                                                                         source
           China                Wuhan lockdown  2020-01-23    up   https://en.wikipedia.org/wiki/2019-20_coronavirus_pandemic_in_mainland_China
     South Korea                super-spreader  2020-02-18    up          https://www.csis.org/analysis/timeline-south-koreas-response-covid-19
           Italy                super-spreader  2020-02-19    up               https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Italy
     South Korea            drive-thru testing  2020-02-23    up          https://www.csis.org/analysis/timeline-south-koreas-response-covid-19
     South Korea             social-distancing  2020-02-29    up          https://www.csis.org/analysis/timeline-south-koreas-response-covid-19
           Italy             Lombardy lockdown  2020-03-08  down               https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Italy
          Taiwan            no-travel advisory  2020-03-15    up              https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Taiwan
          France                      lockdown  2020-03-16    up              https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_France
         Germany    non-essential shops closed  2020-03-16  down             https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Germany
          Canada         ON state of emergency  2020-03-17  down             https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Ontario
         Ontario            state of emergency  2020-03-17  down             https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Ontario
British Columbia            state of emergency  2020-03-18  down    https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_British_Columbia
   United States               NY stay-at-home  2020-03-20    up            https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_New_York
          Russia               Moscow lockdown  2020-03-20  down              https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Russia
       Singapore    extended social distancing  2020-03-20  down           https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Singapore
          Quebec  non-essential business close  2020-03-23  down              https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Quebec
  United Kingdom                      lockdown  2020-03-24  down  https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_the_United_Kingdom
         Alberta  non-essential business close  2020-03-28  down             https://en.wikipedia.org/wiki/2020_coronavirus_pandemic_in_Alberta
";
