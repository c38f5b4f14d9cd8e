use std::collections::HashMap;

use once_cell::sync::Lazy;
use rand::{Rng, SeedableRng, rngs::StdRng};
use smallvec::SmallVec;

use crate::game::config::RuleSet;
use crate::game::entities::{Position, Province};
use crate::game::ids::{IdAllocator, ProvinceId};
use crate::game::resources::ResourceBundle;
use crate::game::store::EntityStore;

#[derive(Debug, Clone)]
pub struct ProvinceTemplate {
    pub name: &'static str,
    pub x: f32,
    pub y: f32,
    pub base_resources: ResourceBundle,
    pub adjacent: &'static [&'static str],
}

fn province(
    name: &'static str,
    (x, y): (f32, f32),
    (gold, food, faith): (u32, u32, u32),
    adjacent: &'static [&'static str],
) -> ProvinceTemplate {
    ProvinceTemplate {
        name,
        x,
        y,
        base_resources: ResourceBundle::new(gold, food, faith),
        adjacent,
    }
}

#[derive(Debug, Clone)]
pub struct MapTemplate {
    pub provinces: Vec<ProvinceTemplate>,
}

static EUROPE_TEMPLATE: Lazy<MapTemplate> = Lazy::new(|| MapTemplate {
    provinces: vec![
        // British Isles
        province("London", (120.0, 150.0), (8, 5, 2), &["York", "Paris"]),
        province("York", (110.0, 120.0), (6, 6, 2), &["London", "Edinburgh"]),
        province("Edinburgh", (105.0, 90.0), (5, 4, 3), &["York"]),
        province("Dublin", (80.0, 130.0), (4, 5, 4), &["London"]),
        // France
        province("Paris", (150.0, 170.0), (10, 6, 3), &["London", "Burgundy", "Toulouse", "Cologne"]),
        province("Toulouse", (140.0, 210.0), (6, 7, 2), &["Paris", "Barcelona", "Milan"]),
        province("Burgundy", (170.0, 180.0), (7, 6, 2), &["Paris", "Milan", "Vienna", "Cologne"]),
        // Iberia
        province("Barcelona", (130.0, 240.0), (7, 5, 3), &["Toulouse", "Castile", "Valencia"]),
        province("Castile", (100.0, 250.0), (6, 4, 4), &["Barcelona", "Lisbon", "Valencia"]),
        province("Lisbon", (70.0, 260.0), (5, 4, 3), &["Castile"]),
        province("Valencia", (120.0, 270.0), (5, 6, 2), &["Barcelona", "Castile"]),
        // Italy
        province("Milan", (180.0, 220.0), (8, 5, 3), &["Toulouse", "Burgundy", "Venice", "Rome"]),
        province("Venice", (200.0, 210.0), (9, 4, 2), &["Milan", "Vienna", "Rome"]),
        province("Rome", (200.0, 250.0), (7, 5, 8), &["Milan", "Venice", "Naples"]),
        province("Naples", (210.0, 280.0), (5, 6, 3), &["Rome"]),
        // Holy Roman Empire
        province("Cologne", (180.0, 150.0), (7, 5, 3), &["Paris", "Burgundy", "Vienna", "Prague", "Hamburg"]),
        province("Hamburg", (190.0, 120.0), (6, 4, 2), &["Cologne", "Prague", "Stockholm"]),
        province("Vienna", (220.0, 180.0), (8, 5, 4), &["Burgundy", "Venice", "Cologne", "Prague", "Buda"]),
        province("Prague", (210.0, 160.0), (6, 5, 3), &["Cologne", "Hamburg", "Vienna", "Krakow"]),
        // Eastern Europe
        province("Krakow", (240.0, 170.0), (5, 6, 4), &["Prague", "Buda", "Kiev"]),
        province("Buda", (240.0, 200.0), (6, 6, 3), &["Vienna", "Krakow", "Kiev"]),
        province("Kiev", (280.0, 180.0), (5, 7, 5), &["Krakow", "Buda", "Moscow", "Constantinople"]),
        province("Moscow", (320.0, 150.0), (6, 6, 6), &["Kiev", "Novgorod"]),
        province("Novgorod", (310.0, 120.0), (5, 5, 4), &["Moscow", "Stockholm"]),
        // Scandinavia
        province("Stockholm", (220.0, 90.0), (6, 4, 3), &["Hamburg", "Novgorod", "Copenhagen"]),
        province("Copenhagen", (200.0, 100.0), (5, 5, 2), &["Stockholm", "Hamburg"]),
        // Balkans
        province("Constantinople", (290.0, 230.0), (9, 5, 7), &["Kiev", "Thessalonica"]),
        province("Thessalonica", (260.0, 250.0), (6, 5, 5), &["Constantinople", "Athens"]),
        province("Athens", (250.0, 280.0), (5, 4, 4), &["Thessalonica"]),
    ],
});

impl MapTemplate {
    pub fn europe() -> &'static MapTemplate {
        &EUROPE_TEMPLATE
    }

    pub fn len(&self) -> usize {
        self.provinces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("province {province} lists unknown neighbor {neighbor}")]
    UnknownAdjacency {
        province: &'static str,
        neighbor: &'static str,
    },
    #[error("province name {0} appears more than once")]
    DuplicateProvince(&'static str),
}

/// Builds the starting provinces from `template`.
///
/// Ids come from `ids`, terrain bonuses from `rng`; everything else is fixed.
/// Adjacency is symmetrized, so one-way template entries become two-way edges.
pub fn generate_with_rng(
    template: &MapTemplate,
    rules: &RuleSet,
    rng: &mut impl Rng,
    ids: &mut IdAllocator,
) -> Result<EntityStore<Province>, MapError> {
    let mut name_to_id: HashMap<&'static str, ProvinceId> = HashMap::new();
    let mut provinces = EntityStore::new();
    let bonus_chance = rules.terrain_bonus_chance.clamp(0.0, 1.0);

    for entry in &template.provinces {
        let id: ProvinceId = ids.next();
        if name_to_id.insert(entry.name, id).is_some() {
            return Err(MapError::DuplicateProvince(entry.name));
        }
        let terrain_bonus = if rng.gen_bool(bonus_chance) {
            rules.terrain_bonus
        } else {
            1.0
        };
        provinces.insert(Province {
            id,
            name: entry.name.to_string(),
            owner: None,
            resources: entry.base_resources,
            troops: 0,
            position: Position {
                x: entry.x,
                y: entry.y,
            },
            adjacent: SmallVec::new(),
            terrain_bonus,
        });
    }

    let mut edges: Vec<(ProvinceId, ProvinceId)> = Vec::new();
    for entry in &template.provinces {
        let from = name_to_id[entry.name];
        for &neighbor in entry.adjacent {
            let Some(&to) = name_to_id.get(neighbor) else {
                return Err(MapError::UnknownAdjacency {
                    province: entry.name,
                    neighbor,
                });
            };
            edges.push((from, to));
        }
    }

    for (from, to) in edges {
        link(&mut provinces, from, to);
        link(&mut provinces, to, from);
    }

    Ok(provinces)
}

/// Seeds its own generator from `seed`; ids still come from `ids`.
pub fn generate(
    template: &MapTemplate,
    rules: &RuleSet,
    seed: u64,
    ids: &mut IdAllocator,
) -> Result<EntityStore<Province>, MapError> {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_with_rng(template, rules, &mut rng, ids)
}

fn link(provinces: &mut EntityStore<Province>, from: ProvinceId, to: ProvinceId) {
    if from == to {
        return;
    }
    if let Some(province) = provinces.get_mut(from) {
        if !province.adjacent.contains(&to) {
            province.adjacent.push(to);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn europe(seed: u64) -> EntityStore<Province> {
        let mut ids = IdAllocator::new(seed);
        generate(MapTemplate::europe(), &RuleSet::default(), seed, &mut ids).unwrap()
    }

    #[test]
    fn europe_has_29_uniquely_named_provinces() {
        let provinces = europe(1);
        assert_eq!(provinces.len(), 29);
        let names: HashSet<&str> = provinces.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 29);
        assert!(provinces.iter().all(|p| p.owner.is_none() && p.troops == 0));
    }

    #[test]
    fn adjacency_is_symmetric_and_free_of_duplicates() {
        let provinces = europe(3);
        for province in &provinces {
            let unique: HashSet<_> = province.adjacent.iter().collect();
            assert_eq!(unique.len(), province.adjacent.len(), "{}", province.name);
            for neighbor in &province.adjacent {
                let other = provinces.get(*neighbor).unwrap();
                assert!(
                    other.is_adjacent_to(province.id),
                    "{} -> {} is one-way",
                    province.name,
                    other.name
                );
            }
        }
    }

    #[test]
    fn one_way_template_entries_become_two_way() {
        // Dublin lists London, London does not list Dublin.
        let provinces = europe(5);
        let by_name = |name: &str| provinces.iter().find(|p| p.name == name).unwrap();
        let london = by_name("London");
        let dublin = by_name("Dublin");
        assert!(london.is_adjacent_to(dublin.id));
        assert!(dublin.is_adjacent_to(london.id));
    }

    #[test]
    fn terrain_bonus_is_either_plain_or_bonus() {
        for seed in 0..10 {
            for province in &europe(seed) {
                assert!(province.terrain_bonus == 1.0 || province.terrain_bonus == 1.2);
            }
        }
    }

    #[test]
    fn same_seed_gives_same_map() {
        assert_eq!(europe(9), europe(9));
    }

    #[test]
    fn unknown_neighbor_fails_fast() {
        let template = MapTemplate {
            provinces: vec![
                province("A", (0.0, 0.0), (1, 1, 1), &["B"]),
                province("B", (1.0, 0.0), (1, 1, 1), &["Atlantis"]),
            ],
        };
        let mut ids = IdAllocator::new(0);
        let err = generate(&template, &RuleSet::default(), 0, &mut ids).unwrap_err();
        assert_eq!(
            err,
            MapError::UnknownAdjacency {
                province: "B",
                neighbor: "Atlantis",
            }
        );
    }

    #[test]
    fn duplicate_names_fail_fast() {
        let template = MapTemplate {
            provinces: vec![
                province("A", (0.0, 0.0), (1, 1, 1), &[]),
                province("A", (1.0, 0.0), (1, 1, 1), &[]),
            ],
        };
        let mut ids = IdAllocator::new(0);
        assert_eq!(
            generate(&template, &RuleSet::default(), 0, &mut ids).unwrap_err(),
            MapError::DuplicateProvince("A")
        );
    }
}
