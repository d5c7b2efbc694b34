//! Engine-wide constants for the BitCraft world and its map page.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Side length of the square game world, in game units.
pub const WORLD_WIDTH: f64 = 23_040.0;

/// Height of the game world, in game units.
pub const WORLD_HEIGHT: f64 = 23_040.0;

/// Vertical stretch applied so the square game grid renders as regular
/// hexagons: the hexagon apothem ratio 2/√3.
///
/// `f64::sqrt` is not const, hence the literal. A test pins it to `2.0 / 3.0_f64.sqrt()`.
pub const HEX_SQUISH: f64 = 1.154_700_538_379_251_5;

/// Game units per readable "N / E" coordinate step.
pub const READABLE_COORD_DIVISOR: f64 = 3.0;

/// Zoom limits of the map page.
pub const MIN_ZOOM: f64 = -6.0;
pub const MAX_ZOOM: f64 = 6.0;

/// Snap zoom levels to these quanta.
pub const ZOOM_SNAP: f64 = 0.1;

/// Icon used for waypoints and for any unknown `iconName`.
pub const DEFAULT_ICON: &str = "waypoint";

/// Icon size used when a feature does not carry a valid `iconSize`.
pub const DEFAULT_ICON_SIZE: [f64; 2] = [32.0, 32.0];

/// Default stroke/fill color of rendered paths.
pub const DEFAULT_PATH_COLOR: &str = "#3388ff";

/// Default stroke weight of rendered paths, in pixels.
pub const DEFAULT_PATH_WEIGHT: f64 = 3.0;

/// Default fill opacity of rendered paths.
pub const DEFAULT_FILL_OPACITY: f64 = 0.2;

/// Radius of a `makeCanvas` circle marker without an explicit `radius`.
pub const DEFAULT_CIRCLE_RADIUS: f64 = 1.0;

/// Pane stacking order for markers and popups drawn from user GeoJSON.
pub const MARKER_ON_TOP_PANE: &str = "markerOnTop";
pub const POPUP_ON_TOP_PANE: &str = "popupOnTop";

/// Line separator used when a popup is given as several lines.
pub const POPUP_LINE_BREAK: &str = "<br>";

/// Claim pages on bitjita, linked from claim popups.
pub const CLAIM_URL_PREFIX: &str = "https://bitjita.com/claims/";

/// GitHub gist API root.
pub const GIST_API_BASE: &str = "https://api.github.com/gists/";

/// Layers of the map page. Claim and cave tiers get one layer each,
/// named `claimT{tier}Layer` and `caveT{tier}Layer`.
pub const TERRAIN_LAYER: &str = "terrainLayer";
pub const TREES_LAYER: &str = "treesLayer";
pub const TEMPLES_LAYER: &str = "templesLayer";
pub const RUINED_LAYER: &str = "ruinedLayer";
pub const BANKS_LAYER: &str = "banksLayer";
pub const MARKETS_LAYER: &str = "marketsLayer";
pub const WAYSTONES_LAYER: &str = "waystonesLayer";
pub const GRIDS_LAYER: &str = "gridsLayer";
pub const WAYPOINTS_LAYER: &str = "waypointsLayer";

/// Claim tiers run from 0, cave tiers from 1.
pub const CLAIM_TIERS: std::ops::RangeInclusive<u64> = 0..=10;
pub const CAVE_TIERS: std::ops::RangeInclusive<u64> = 1..=10;
