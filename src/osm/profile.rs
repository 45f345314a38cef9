// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

/// Describes which OSM ways can be used for routing, and in which direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Profile<'a> {
    /// Human readable name of the routing profile,
    /// customary the most specific [access tag](https://wiki.openstreetmap.org/wiki/Key:access).
    ///
    /// This values us not used for actual OSM data interpretation,
    /// except when set to "foot", which makes `oneway` tags ignored - only `oneway:foot`
    /// tags are considered, except on:
    ///    - `highway=footway`,
    ///    - `highway=path`,
    ///    - `highway=steps`,
    ///    - `highway=platform`
    ///    - `public_transport=platform`,
    ///    - `railway=platform`.
    pub name: &'a str,

    /// Values of the [highway](https://wiki.openstreetmap.org/wiki/Key:highway) tag
    /// of ways which can be used for routing.
    ///
    /// Edge costs are always equal to the length of the way in meters;
    /// there are no preferences between different kinds of roads.
    pub highways: &'a [&'a str],

    /// Array of OSM [access tags](https://wiki.openstreetmap.org/wiki/Key:access#Land-based_transportation)
    /// (in order from least to most specific) to consider when checking for road prohibitions.
    ///
    /// This array is used mainly used to follow the access tags, but also to follow mode-specific
    /// one-way restrictions (see [Profile::is_allowed] and [Profile::way_direction]).
    pub access: &'a [&'a str],

    /// Force no routing over [motorroad=yes](https://wiki.openstreetmap.org/wiki/Key:motorroad) ways.
    pub disallow_motorroad: bool,
}

impl<'a> Profile<'a> {
    /// Checks if a way with the given tags can be used for routing,
    /// by checking its highway tag against [Profile::highways]
    /// and by considering [Profile::is_allowed].
    pub fn is_routable(&self, tags: &HashMap<String, String>) -> bool {
        let highway = tags.get("highway").map(|v| v.as_str()).unwrap_or("");
        !highway.is_empty() && self.highways.contains(&highway) && self.is_allowed(tags)
    }

    /// Checks if the way is routable, by considering motor roads ([Profile::disallow_motorroad])
    /// and access tags ([Profile::access]).
    pub fn is_allowed(&self, tags: &HashMap<String, String>) -> bool {
        // Check against the motorroad tag
        if self.disallow_motorroad && tags.get("motorroad").map(|v| v.as_str()) == Some("yes") {
            return false;
        }

        // Check against the access tags
        match self
            .access
            .iter()
            .rev()
            .find_map(|&mode| tags.get(mode).map(|v| v.as_str()))
        {
            Some("no") | Some("private") => false,
            _ => true,
        }
    }

    /// Checks if a way is traversable forward (first return value) and
    /// backwards (second return value) by investigating mode-specific and generic one-way tags.
    ///
    /// Some ways (highway=motorway, highway=motorway_link, junction=roundabout and
    /// junction=circular) default to being one-way, except if overridden by specific tags.
    pub fn way_direction(&self, tags: &HashMap<String, String>) -> (bool, bool) {
        let mut forward = true;
        let mut backward = true;

        // Default one-way ways (foot profile exception - does not apply)
        if !self.apply_foot_exceptions() {
            match tags.get("highway").map(|s| s.as_str()).unwrap_or("") {
                "motorway" | "motorway_link" => {
                    backward = false;
                }
                _ => {}
            }

            match tags.get("junction").map(|s| s.as_str()).unwrap_or("") {
                "roundabout" | "circular" => {
                    backward = false;
                }
                _ => {}
            }
        }

        // Check the oneway tag
        match self.get_active_oneway_value(tags) {
            "yes" | "true" | "1" => {
                forward = true;
                backward = false;
            }

            "-1" | "reverse" => {
                forward = false;
                backward = true;
            }

            "no" => {
                forward = true;
                backward = true;
            }

            _ => {}
        }

        return (forward, backward);
    }

    /// Returns the value of the most specific "oneway:MODE" tag (based on [Profile::access]),
    /// falling back to simply "oneway", and returning an empty string if no relevant tag was found.
    fn get_active_oneway_value<'t>(&self, tags: &'t HashMap<String, String>) -> &'t str {
        if self.apply_foot_exceptions() {
            // foot profile exception - only consider "oneway:foot" and "oneway" in select cases
            if let Some(oneway_foot) = tags.get("oneway:foot") {
                return oneway_foot.as_str();
            }

            if Self::allow_generic_oneway_to_apply_on_foot(tags) {
                if let Some(oneway) = tags.get("oneway") {
                    return oneway.as_str();
                }
            }

            return "";
        } else {
            self.access
                .iter()
                .rev()
                .filter(|&&mode| mode != "access")
                .find_map(|&mode| tags.get(&format!("oneway:{}", mode)))
                .or_else(|| tags.get("oneway"))
                .map(|oneway_tag| oneway_tag.as_str())
                .unwrap_or("")
        }
    }

    fn allow_generic_oneway_to_apply_on_foot(tags: &HashMap<String, String>) -> bool {
        // By default, on foot, only "oneway:foot" is considered. However, on the following
        // ways the generic "oneway" tag also applies.

        // highway=footway, highway=path, highway=steps, highway=platform
        match tags.get("highway").map(|v| v.as_str()) {
            Some("footway") | Some("path") | Some("steps") | Some("platform") => return true,
            _ => {}
        }

        // public_transport=platform
        if tags.get("public_transport").map(|v| v.as_str()) == Some("platform") {
            return true;
        }

        // railway=platform
        if tags.get("railway").map(|v| v.as_str()) == Some("platform") {
            return true;
        }

        // Default to false
        return false;
    }

    fn apply_foot_exceptions(&self) -> bool {
        self.name == "foot"
    }
}

/// Returns the name under which a way should be narrated: its `name` tag,
/// falling back to its `ref` tag, or an empty string if neither is present.
pub fn street_name(tags: &HashMap<String, String>) -> &str {
    ["name", "ref"]
        .iter()
        .filter_map(|&key| tags.get(key))
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .unwrap_or("")
}

/// Routing [Profile] for pedestrians, covering every kind of way
/// a person can walk on, with appropriate [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const FOOT_PROFILE: Profile = Profile {
    name: "foot",
    highways: &[
        "trunk",
        "trunk_link",
        "primary",
        "primary_link",
        "secondary",
        "secondary_link",
        "tertiary",
        "tertiary_link",
        "unclassified",
        "residential",
        "living_street",
        "service",
        "road",
        "track",
        "pedestrian",
        "footway",
        "path",
        "steps",
        "corridor",
        "cycleway",
        "bridleway",
        "platform",
    ],
    access: &["access", "foot"],
    disallow_motorroad: true,
};

/// Routing [Profile] for bicycles, with appropriate
/// [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const BICYCLE_PROFILE: Profile = Profile {
    name: "bicycle",
    highways: &[
        "trunk",
        "trunk_link",
        "primary",
        "primary_link",
        "secondary",
        "secondary_link",
        "tertiary",
        "tertiary_link",
        "unclassified",
        "residential",
        "living_street",
        "service",
        "road",
        "track",
        "path",
        "cycleway",
    ],
    access: &["access", "vehicle", "bicycle"],
    disallow_motorroad: true,
};

/// Routing [Profile] for motorcycles and scooters, with appropriate
/// [access tags](https://wiki.openstreetmap.org/wiki/Key:access).
pub const MOTORCYCLE_PROFILE: Profile = Profile {
    name: "motorcycle",
    highways: &[
        "motorway",
        "motorway_link",
        "trunk",
        "trunk_link",
        "primary",
        "primary_link",
        "secondary",
        "secondary_link",
        "tertiary",
        "tertiary_link",
        "unclassified",
        "residential",
        "living_street",
        "service",
        "road",
    ],
    access: &["access", "vehicle", "motor_vehicle", "motorcycle"],
    disallow_motorroad: false,
};

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! tags {
        {} => { HashMap::default() };
        {$( $k:literal : $v:literal ),+} => {
            HashMap::from_iter([ $( ($k.to_string(), $v.to_string()) ),+ ])
        };
    }

    #[test]
    fn is_routable() {
        assert!(FOOT_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(!BICYCLE_PROFILE.is_routable(&tags! {"highway": "footway"}));
        assert!(!MOTORCYCLE_PROFILE.is_routable(&tags! {"highway": "steps"}));
        assert!(MOTORCYCLE_PROFILE.is_routable(&tags! {"highway": "motorway"}));
        assert!(!FOOT_PROFILE.is_routable(&tags! {"highway": "motorway"}));
        assert!(!FOOT_PROFILE.is_routable(&tags! {"building": "yes"}));
        assert!(!FOOT_PROFILE.is_routable(&tags! {}));
    }

    #[test]
    fn is_allowed() {
        assert!(FOOT_PROFILE.is_allowed(&tags! {}));
        assert!(!FOOT_PROFILE.is_allowed(&tags! {"access": "private"}));
        assert!(FOOT_PROFILE.is_allowed(&tags! {"access": "private", "foot": "yes"}));
        assert!(!FOOT_PROFILE.is_allowed(&tags! {"highway": "trunk", "motorroad": "yes"}));
        assert!(MOTORCYCLE_PROFILE.is_allowed(&tags! {"highway": "trunk", "motorroad": "yes"}));
        assert!(!MOTORCYCLE_PROFILE.is_allowed(&tags! {"motor_vehicle": "no"}));
        assert!(MOTORCYCLE_PROFILE.is_allowed(&tags! {"motor_vehicle": "no", "motorcycle": "yes"}));
        assert!(BICYCLE_PROFILE.is_allowed(&tags! {"motor_vehicle": "no"}));
    }

    #[test]
    fn way_direction() {
        assert_eq!(BICYCLE_PROFILE.way_direction(&tags! {}), (true, true));
        assert_eq!(BICYCLE_PROFILE.way_direction(&tags! {"oneway": "yes"}), (true, false));
        assert_eq!(BICYCLE_PROFILE.way_direction(&tags! {"oneway": "-1"}), (false, true));
        assert_eq!(
            BICYCLE_PROFILE.way_direction(&tags! {"oneway": "yes", "oneway:bicycle": "no"}),
            (true, true)
        );
        assert_eq!(
            MOTORCYCLE_PROFILE.way_direction(&tags! {"highway": "motorway"}),
            (true, false)
        );
        assert_eq!(
            MOTORCYCLE_PROFILE.way_direction(&tags! {"junction": "roundabout"}),
            (true, false)
        );
    }

    #[test]
    fn way_direction_foot() {
        assert_eq!(
            FOOT_PROFILE.way_direction(&tags! {"highway": "secondary", "oneway": "yes"}),
            (true, true)
        );
        assert_eq!(
            FOOT_PROFILE.way_direction(&tags! {"highway": "footway", "oneway": "yes"}),
            (true, false)
        );
        assert_eq!(
            FOOT_PROFILE.way_direction(&tags! {"highway": "secondary", "oneway:foot": "-1"}),
            (false, true)
        );
        assert_eq!(
            FOOT_PROFILE.way_direction(&tags! {"junction": "roundabout"}),
            (true, true)
        );
    }

    #[test]
    fn street_names() {
        assert_eq!(street_name(&tags! {"name": "Giải Phóng", "ref": "1A"}), "Giải Phóng");
        assert_eq!(street_name(&tags! {"ref": "1A"}), "1A");
        assert_eq!(street_name(&tags! {"name": " ", "ref": "1A"}), "1A");
        assert_eq!(street_name(&tags! {"highway": "footway"}), "");
    }
}
