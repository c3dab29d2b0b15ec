//! Static kiosk content: shared chrome, fixed pages and the logo.

/// Styles shared by every page
pub const SITE_CSS: &str = include_str!("content/site.css");
/// Extra styles for the weather page
pub const WEATHER_CSS: &str = include_str!("content/weather.css");

pub const LOGO_SVG: &str = include_str!("content/logo.svg");

/// Shown in place of live data when the sensor did not come up
pub const UNAVAILABLE_NOTICE: &str = include_str!("content/unavailable.html");
pub const UNAVAILABLE_HEADING: &str = "Weather Sensor Unavailable";

pub const LOCATION: &str = "Diversion Dam Area, Roosevelt Lake";
pub const SENSOR_NAME: &str = "BME280";

/// One entry of the navigation bar
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
}

pub const NAVIGATION: &[NavLink] = &[
    NavLink {
        href: "/",
        label: "Home",
    },
    NavLink {
        href: "/about",
        label: "Activities &amp; Wildlife",
    },
    NavLink {
        href: "/weather",
        label: "Weather",
    },
];

/// Everything around the page body: styles, navigation, site name
#[derive(Clone, Copy, Debug)]
pub struct Chrome {
    pub site_name: &'static str,
    pub stylesheet: &'static str,
    pub navigation: &'static [NavLink],
}

impl Chrome {
    pub const KIOSK: Chrome = Chrome {
        site_name: "Roosevelt Lake",
        stylesheet: SITE_CSS,
        navigation: NAVIGATION,
    };
}

/// A page whose body never changes
#[derive(Clone, Copy, Debug)]
pub struct StaticPage {
    pub path: &'static str,
    pub title: &'static str,
    pub heading: &'static str,
    pub body: &'static str,
}

pub const HOME: StaticPage = StaticPage {
    path: "/",
    title: "Diversion Dam - Self Tour",
    heading: "&#127966;&#65039; Roosevelt Lake &amp; Diversion Dam",
    body: include_str!("content/home.html"),
};

pub const ABOUT: StaticPage = StaticPage {
    path: "/about",
    title: "Activities &amp; Wildlife",
    heading: "&#127907; Activities &amp; Wildlife",
    body: include_str!("content/about.html"),
};
