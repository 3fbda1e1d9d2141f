pub mod capacity_service;
pub mod city_tally;
pub mod daily_summary;
pub mod navigation_guard;
pub mod priority_resolver;
pub mod recommendation_service;
pub mod schedule_utils;
pub mod settings_service;
pub mod slot_stacking;
pub mod week_cache;
