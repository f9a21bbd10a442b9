//! Synthetic road network for the Hague corridor.
//!
//! About thirty nodes covering both registered scenarios: the A4 and N-road
//! approaches from Schiphol, the A13 and Delft/Rijswijk approaches from
//! Rotterdam The Hague airport, and the inner city between the World Forum
//! and the Mauritshuis.  Coordinates are approximate; road classes, tunnels
//! and bridges follow the real corridor closely enough to exercise every
//! scoring rule.

use cp_core::{GeoBounds, GeoPoint, RoadClass, ScenarioKey};
use cp_spatial::{RoadAttrs, RoadNetwork, RoadNetworkBuilder};

/// Build the corridor network.  Edges inside The Hague centre are tagged
/// dense urban.
pub fn build_network() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::with_capacity(32, 96);
    let centre: Vec<GeoBounds> = ScenarioKey::Schiphol.scenario().dense_urban;
    b.dense_urban_regions(&centre);

    // ── Waypoints ─────────────────────────────────────────────────────────
    let schiphol    = b.add_node(GeoPoint::new(52.3105, 4.7683));
    let rtm_airport = b.add_node(GeoPoint::new(51.9569, 4.4372));
    let world_forum = b.add_node(GeoPoint::new(52.0930, 4.2867));
    let mauritshuis = b.add_node(GeoPoint::new(52.0809, 4.3146));

    // ── Schiphol approach ─────────────────────────────────────────────────
    let hoofddorp      = b.add_node(GeoPoint::new(52.2900, 4.7000));
    let nieuw_vennep   = b.add_node(GeoPoint::new(52.2550, 4.6350));
    let a4_leiden_n    = b.add_node(GeoPoint::new(52.1800, 4.5200));
    let a4_leiden_s    = b.add_node(GeoPoint::new(52.1650, 4.4950));
    let lisse          = b.add_node(GeoPoint::new(52.2570, 4.5570));
    let sassenheim     = b.add_node(GeoPoint::new(52.2250, 4.5230));
    let leiden_centre  = b.add_node(GeoPoint::new(52.1600, 4.4900));
    let oegstgeest     = b.add_node(GeoPoint::new(52.1800, 4.4700));
    let wassenaar      = b.add_node(GeoPoint::new(52.1420, 4.4010));
    let wassenaar_dorp = b.add_node(GeoPoint::new(52.1450, 4.3900));
    let leidschendam   = b.add_node(GeoPoint::new(52.0870, 4.3900));

    // ── Rotterdam approach ────────────────────────────────────────────────
    let a13_airport    = b.add_node(GeoPoint::new(51.9600, 4.4200));
    let a13_delft_zuid = b.add_node(GeoPoint::new(51.9900, 4.3850));
    let a13_delft_n    = b.add_node(GeoPoint::new(52.0200, 4.3700));
    let ypenburg       = b.add_node(GeoPoint::new(52.0420, 4.3650));
    let delft_centre   = b.add_node(GeoPoint::new(52.0116, 4.3571));
    let delft_canal    = b.add_node(GeoPoint::new(52.0180, 4.3500));
    let rijswijk       = b.add_node(GeoPoint::new(52.0360, 4.3200));
    let overvoorde     = b.add_node(GeoPoint::new(51.9720, 4.4050));

    // ── The Hague ─────────────────────────────────────────────────────────
    let clausplein     = b.add_node(GeoPoint::new(52.0600, 4.3600));
    let utrechtsebaan  = b.add_node(GeoPoint::new(52.0720, 4.3330));
    let centraal       = b.add_node(GeoPoint::new(52.0805, 4.3220));
    let spui           = b.add_node(GeoPoint::new(52.0770, 4.3180));
    let plein          = b.add_node(GeoPoint::new(52.0795, 4.3140));
    let lange_voorhout = b.add_node(GeoPoint::new(52.0840, 4.3120));
    let koningskade    = b.add_node(GeoPoint::new(52.0880, 4.3100));
    let laan_meerdervoort = b.add_node(GeoPoint::new(52.0760, 4.2900));
    let scheveningseweg   = b.add_node(GeoPoint::new(52.0920, 4.2960));
    let johan_de_wittlaan = b.add_node(GeoPoint::new(52.0950, 4.2820));
    let centrum_west   = b.add_node(GeoPoint::new(52.0790, 4.3040));

    use RoadClass::*;

    // Schiphol → A4 → Leiden, with the N-road alternative through Lisse.
    b.add_measured_road(schiphol, hoofddorp, Motorway);
    b.add_measured_road(hoofddorp, nieuw_vennep, Motorway);
    b.add_measured_road(nieuw_vennep, a4_leiden_n, Motorway);
    bridge(&mut b, a4_leiden_n, a4_leiden_s, Motorway);
    b.add_measured_road(a4_leiden_s, clausplein, Motorway);

    b.add_measured_road(hoofddorp, lisse, Secondary);
    b.add_measured_road(lisse, sassenheim, Secondary);
    b.add_measured_road(sassenheim, oegstgeest, Secondary);
    b.add_measured_road(oegstgeest, leiden_centre, Tertiary);
    bridge(&mut b, leiden_centre, a4_leiden_s, Tertiary);
    b.add_measured_road(oegstgeest, wassenaar, Primary);
    b.add_measured_road(wassenaar, wassenaar_dorp, Residential);
    b.add_measured_road(wassenaar_dorp, johan_de_wittlaan, Residential);
    b.add_measured_road(wassenaar, leidschendam, Primary);
    b.add_measured_road(leidschendam, koningskade, Primary);
    b.add_measured_road(leidschendam, clausplein, Trunk);

    // Rotterdam airport → A13, with the Delft/Rijswijk alternative.
    b.add_measured_road(rtm_airport, a13_airport, Secondary);
    b.add_measured_road(rtm_airport, overvoorde, Tertiary);
    b.add_measured_road(a13_airport, a13_delft_zuid, Motorway);
    b.add_measured_road(a13_delft_zuid, a13_delft_n, Motorway);
    b.add_measured_road(a13_delft_n, ypenburg, Motorway);
    b.add_measured_road(ypenburg, clausplein, Motorway);
    b.add_measured_road(overvoorde, delft_centre, Tertiary);
    b.add_measured_road(a13_delft_zuid, delft_centre, Secondary);
    bridge(&mut b, delft_centre, delft_canal, Residential);
    b.add_measured_road(delft_canal, rijswijk, Secondary);
    b.add_measured_road(a13_delft_n, delft_canal, Tertiary);
    b.add_measured_road(rijswijk, laan_meerdervoort, Secondary);
    b.add_measured_road(rijswijk, spui, Secondary);

    // Into the centre: the Utrechtsebaan runs underground near Centraal.
    b.add_measured_road(clausplein, utrechtsebaan, Motorway);
    tunnel(&mut b, utrechtsebaan, centraal, Trunk);
    b.add_measured_road(utrechtsebaan, spui, Primary);
    b.add_measured_road(centraal, spui, Secondary);
    b.add_measured_road(centraal, lange_voorhout, Secondary);
    b.add_measured_road(spui, plein, Residential);
    let binnenhof_lane = narrow(&b, plein, mauritshuis, LivingStreet);
    b.add_road(plein, mauritshuis, binnenhof_lane);
    b.add_measured_road(lange_voorhout, mauritshuis, Residential);
    b.add_measured_road(lange_voorhout, koningskade, Tertiary);
    b.add_measured_road(koningskade, scheveningseweg, Secondary);
    b.add_measured_road(scheveningseweg, world_forum, Secondary);
    b.add_measured_road(johan_de_wittlaan, world_forum, Primary);
    b.add_measured_road(laan_meerdervoort, centrum_west, Secondary);
    b.add_measured_road(centrum_west, spui, Residential);
    b.add_measured_road(laan_meerdervoort, johan_de_wittlaan, Secondary);
    b.add_measured_road(centrum_west, koningskade, Tertiary);

    // ── Elevated structures ───────────────────────────────────────────────
    for p in [
        GeoPoint::new(52.0797, 4.3233), // Hoftoren
        GeoPoint::new(52.0781, 4.3262), // ministry towers
        GeoPoint::new(52.0818, 4.3170), // Binnenhof roofline
        GeoPoint::new(52.0941, 4.2838), // World Forum tower block
        GeoPoint::new(52.0610, 4.3575), // Prins Clausplein gantry mast
    ] {
        b.add_vantage_point(p);
    }

    b.build()
}

fn bridge(b: &mut RoadNetworkBuilder, x: cp_core::NodeId, y: cp_core::NodeId, class: RoadClass) {
    let len = b.distance_m(x, y);
    b.add_road(x, y, RoadAttrs::new(len, class).bridge());
}

fn tunnel(b: &mut RoadNetworkBuilder, x: cp_core::NodeId, y: cp_core::NodeId, class: RoadClass) {
    let len = b.distance_m(x, y);
    b.add_road(x, y, RoadAttrs::new(len, class).tunnel());
}

fn narrow(b: &RoadNetworkBuilder, x: cp_core::NodeId, y: cp_core::NodeId, class: RoadClass) -> RoadAttrs {
    RoadAttrs::new(b.distance_m(x, y), class).residential().narrow()
}
