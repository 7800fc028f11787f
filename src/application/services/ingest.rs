//! Ingestion service
//!
//! Fetches the documents for each id, builds a `PokemonRecord` and upserts it
//! into a record store in batches. Moves and types are ingested the same way
//! from the upstream resource lists.

use std::fmt::Display;
use std::ops::RangeInclusive;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use crate::application::documents::{
    names_of, parse_document, EvolutionChainDocument, MoveDocument, NamedResource,
    PokemonDocument, ResourceList, SpeciesDocument, TypeDocument,
};
use crate::application::services::evolution::{ChainData, EvolutionPolicy};
use crate::application::{ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    clean_flavor_text, parse_generation, BaseStats, MoveRecord, PokemonRecord, Record,
    TypeRecord, NO_DEX_ENTRY_DATA, NO_EFFECT_DESCRIPTION, NO_ENGLISH_DEX_ENTRY,
};
use crate::infrastructure::traits::{
    resource_list_url, resource_url, DocumentSource, RecordStore,
};

/// Upper bound on resource list requests, above any upstream table size.
pub const RESOURCE_LIST_LIMIT: u32 = 10_000;

/// Counts for one `populate` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub added: usize,
    pub failed: usize,
    pub total: usize,
}

/// Service for building species records from upstream documents.
pub struct IngestService {
    source: Arc<dyn DocumentSource>,
    settings: Arc<Settings>,
    policy: EvolutionPolicy,
}

impl IngestService {
    pub fn new(source: Arc<dyn DocumentSource>, settings: Arc<Settings>) -> Self {
        Self::with_policy(source, settings, EvolutionPolicy::default())
    }

    pub fn with_policy(
        source: Arc<dyn DocumentSource>,
        settings: Arc<Settings>,
        policy: EvolutionPolicy,
    ) -> Self {
        Self {
            source,
            settings,
            policy,
        }
    }

    /// Fetch and assemble the record for `id`.
    ///
    /// Only the `pokemon/{id}` document is required. Missing species or chain
    /// data degrade the record instead of failing it.
    #[instrument(level = "debug", skip(self))]
    pub fn fetch_record(&self, id: u32) -> ApplicationResult<PokemonRecord> {
        let url = resource_url(&self.settings.api_base_url, "pokemon", id);
        let pokemon: PokemonDocument = self.fetch_document(&url)?;
        let name = pokemon.name.clone();

        let species = self.fetch_species(&pokemon);
        let chain = match &species {
            Some(species) => self.fetch_chain(&name, species),
            None => {
                warn!("could not fetch species data for {}; some fields will be missing", name);
                ChainData::NoSpecies
            }
        };

        let stats = BaseStats {
            hp: pokemon.base_stat("hp"),
            attack: pokemon.base_stat("attack"),
            defense: pokemon.base_stat("defense"),
            special_attack: pokemon.base_stat("special-attack"),
            special_defense: pokemon.base_stat("special-defense"),
            speed: pokemon.base_stat("speed"),
        };
        let outcome = self.policy.classify(&name, &chain);

        let record = PokemonRecord {
            id,
            name,
            generation: species.as_ref().and_then(generation_of),
            type1: pokemon.type_name(0),
            type2: pokemon.type_name(1),
            bst: stats.total(),
            stats,
            stage: outcome.stage,
            is_fully_evolved: outcome.is_fully_evolved,
            evolution_source: outcome.source,
            dex_entry: dex_entry_of(species.as_ref()),
        };

        let missing = record.missing_critical_fields();
        if !missing.is_empty() {
            warn!(
                "critical data missing for id {} ({}): {}",
                id,
                record.name,
                missing.join(", ")
            );
        }
        Ok(record)
    }

    /// Ingest every id in `ids` into `store`, committing every `batch_size` ids.
    ///
    /// A failed id is counted and skipped. A failed commit aborts the run.
    #[instrument(level = "info", skip(self, store), fields(location = %store.location().display()))]
    pub fn populate(
        &self,
        store: &mut dyn RecordStore<PokemonRecord>,
        ids: RangeInclusive<u32>,
    ) -> ApplicationResult<IngestReport> {
        self.ingest_batches(store, ids, |id| self.fetch_record(*id))
    }

    /// Fetch and assemble the move row for `id`.
    pub fn fetch_move(&self, id: u32) -> ApplicationResult<MoveRecord> {
        self.move_at(&resource_url(&self.settings.api_base_url, "move", id))
    }

    /// Fetch and assemble the type row for `id`.
    pub fn fetch_type(&self, id: u32) -> ApplicationResult<TypeRecord> {
        self.type_at(&resource_url(&self.settings.api_base_url, "type", id))
    }

    /// Ingest every move in the upstream move list.
    ///
    /// Fails only when the list itself cannot be fetched, or on a failed commit.
    #[instrument(level = "info", skip(self, store), fields(location = %store.location().display()))]
    pub fn populate_moves(
        &self,
        store: &mut dyn RecordStore<MoveRecord>,
    ) -> ApplicationResult<IngestReport> {
        let listed = self.fetch_list("move")?;
        self.ingest_batches(store, listed, |resource| self.move_at(&resource.url))
    }

    /// Ingest every type in the upstream type list.
    #[instrument(level = "info", skip(self, store), fields(location = %store.location().display()))]
    pub fn populate_types(
        &self,
        store: &mut dyn RecordStore<TypeRecord>,
    ) -> ApplicationResult<IngestReport> {
        let listed = self.fetch_list("type")?;
        self.ingest_batches(store, listed, |resource| self.type_at(&resource.url))
    }

    fn ingest_batches<K, R, F>(
        &self,
        store: &mut dyn RecordStore<R>,
        keys: impl IntoIterator<Item = K>,
        fetch: F,
    ) -> ApplicationResult<IngestReport>
    where
        K: Display,
        R: Record,
        F: Fn(&K) -> ApplicationResult<R>,
    {
        let batch_size = self.settings.batch_size.max(1);
        let mut report = IngestReport::default();
        let mut uncommitted = 0;

        for key in keys {
            report.total += 1;
            match fetch(&key) {
                Ok(record) => match store.upsert(&record) {
                    Ok(()) => {
                        debug!("stored {} ({})", record.name(), record.id());
                        report.added += 1;
                    }
                    Err(e) => {
                        error!("could not store {}: {}", key, e);
                        report.failed += 1;
                    }
                },
                Err(e) => {
                    error!("skipping {}: {}", key, e);
                    report.failed += 1;
                }
            }

            uncommitted += 1;
            if uncommitted == batch_size {
                store
                    .commit()
                    .with_store_context("commit", store.location())?;
                info!("committed batch ending at {} ({} processed)", key, report.total);
                uncommitted = 0;
            }
        }

        if uncommitted > 0 {
            store
                .commit()
                .with_store_context("commit", store.location())?;
        }

        info!(
            "ingestion finished: {} added, {} failed, {} total",
            report.added, report.failed, report.total
        );
        Ok(report)
    }

    fn fetch_list(&self, kind: &str) -> ApplicationResult<Vec<NamedResource>> {
        let url = resource_list_url(&self.settings.api_base_url, kind, RESOURCE_LIST_LIMIT);
        let list: ResourceList = self.fetch_document(&url)?;
        info!("{} {} resources listed (count {})", list.results.len(), kind, list.count);
        Ok(list.results)
    }

    fn move_at(&self, url: &str) -> ApplicationResult<MoveRecord> {
        let doc: MoveDocument = self.fetch_document(url)?;
        let effect = match doc.effect_text() {
            Some(text) => text.to_string(),
            None => {
                debug!("no effect text for move {}", doc.name);
                NO_EFFECT_DESCRIPTION.to_string()
            }
        };
        let name_of = |r: &Option<NamedResource>| r.as_ref().map(|r| r.name.clone());

        Ok(MoveRecord {
            id: doc.id,
            accuracy: doc.accuracy,
            pp: doc.pp,
            priority: doc.priority,
            power: doc.power,
            damage_class: name_of(&doc.damage_class),
            move_type: name_of(&doc.move_type),
            effect,
            effect_chance: doc.effect_chance,
            target: name_of(&doc.target),
            learned_by_pokemon: names_of(&doc.learned_by_pokemon),
            name: doc.name,
        })
    }

    fn type_at(&self, url: &str) -> ApplicationResult<TypeRecord> {
        let doc: TypeDocument = self.fetch_document(url)?;
        let relations = &doc.damage_relations;

        Ok(TypeRecord {
            id: doc.id,
            no_damage_from: names_of(&relations.no_damage_from),
            weak_to: names_of(&relations.double_damage_from),
            resist_from: names_of(&relations.half_damage_from),
            no_damage_to: names_of(&relations.no_damage_to),
            double_to: names_of(&relations.double_damage_to),
            half_to: names_of(&relations.half_damage_to),
            name: doc.name,
        })
    }

    fn fetch_document<T: DeserializeOwned>(&self, url: &str) -> ApplicationResult<T> {
        let body = self.source.fetch(url).with_url_context(url)?;
        parse_document(url, &body)
    }

    fn fetch_species(&self, pokemon: &PokemonDocument) -> Option<SpeciesDocument> {
        let url = match &pokemon.species {
            Some(species) if !species.url.is_empty() => species.url.as_str(),
            _ => {
                warn!("no species URL for {} (id {})", pokemon.name, pokemon.id);
                return None;
            }
        };
        self.fetch_document(url)
            .map_err(|e| warn!("{}", e))
            .ok()
    }

    fn fetch_chain(&self, name: &str, species: &SpeciesDocument) -> ChainData {
        let Some(chain) = &species.evolution_chain else {
            warn!("no evolution chain URL for {}", name);
            return ChainData::Missing;
        };
        match self.fetch_document::<EvolutionChainDocument>(&chain.url) {
            Ok(doc) => ChainData::Present(doc.chain.to_node()),
            Err(e) => {
                warn!("failed to fetch evolution chain for {}: {}", name, e);
                ChainData::Missing
            }
        }
    }
}

fn generation_of(species: &SpeciesDocument) -> Option<u8> {
    let Some(generation) = &species.generation else {
        warn!("generation info missing for {}", species.name);
        return None;
    };
    parse_generation(&generation.name)
        .map_err(|e| warn!("{} (species {})", e, species.name))
        .ok()
}

/// First English flavor text, else the first entry in any language.
fn dex_entry_of(species: Option<&SpeciesDocument>) -> String {
    let Some(species) = species else {
        return NO_DEX_ENTRY_DATA.to_string();
    };
    let entries = &species.flavor_text_entries;

    if let Some(entry) = entries.iter().find(|e| e.language_name() == "en") {
        return clean_flavor_text(&entry.flavor_text);
    }
    match entries.first() {
        Some(entry) => {
            warn!(
                "no English dex entry for {}; using first available entry (language: {})",
                species.name,
                entry.language_name()
            );
            clean_flavor_text(&entry.flavor_text)
        }
        None => NO_ENGLISH_DEX_ENTRY.to_string(),
    }
}
