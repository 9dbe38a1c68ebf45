// src/bin/populate.rs
// Seeds a running person-registry with sample people and prints both city reports.
use anyhow::{bail, Context};
use dotenv::dotenv;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::process;
use std::time::{Duration, Instant};

// --- ANSI colors ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// --- Payloads ---

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct SampleAddress {
    address1: &'static str,
    city: &'static str,
}

#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct SamplePerson {
    first_name: &'static str,
    last_name: &'static str,
    age: i32,
    addresses: Vec<SampleAddress>,
}

#[derive(Deserialize, Debug)]
struct CityPopulation {
    city: Option<String>,
    count: i64,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Resident {
    first_name: String,
    age: i32,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct OldestPerson {
    city: Option<String>,
    oldest_person: Resident,
}

fn address(address1: &'static str, city: &'static str) -> SampleAddress {
    SampleAddress { address1, city }
}

fn sample_people() -> Vec<SamplePerson> {
    vec![
        SamplePerson { first_name: "Alice", last_name: "Moreau", age: 34, addresses: vec![address("12 Rue Oberkampf", "Paris")] },
        SamplePerson { first_name: "Alfonso", last_name: "Ruiz", age: 58, addresses: vec![address("Calle Mayor 3", "Madrid"), address("Via Roma 8", "Rome")] },
        SamplePerson { first_name: "Bianca", last_name: "Conti", age: 71, addresses: vec![address("Via Appia 40", "Rome")] },
        SamplePerson { first_name: "Bruno", last_name: "Keller", age: 22, addresses: vec![address("Torstrasse 5", "Berlin")] },
        SamplePerson { first_name: "Chloe", last_name: "Martin", age: 45, addresses: vec![address("Quai Voltaire 1", "Paris")] },
        SamplePerson { first_name: "Diego", last_name: "Santos", age: 29, addresses: vec![address("Gran Via 21", "Madrid")] },
        SamplePerson { first_name: "Elena", last_name: "Rossi", age: 63, addresses: vec![address("Corso Italia 2", "Rome"), address("Rue de Rivoli 9", "Paris")] },
        SamplePerson { first_name: "Felix", last_name: "Wagner", age: 39, addresses: vec![address("Kastanienallee 14", "Berlin")] },
        SamplePerson { first_name: "Greta", last_name: "Lind", age: 27, addresses: Vec::new() },
    ]
}

// --- Seeder ---

struct PersonSeeder {
    base_url: String,
    client: Client,
}

impl PersonSeeder {
    fn new(base_url: String) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { base_url, client })
    }

    async fn check_service_health(&self) -> bool {
        match self.client.get(format!("{}/health", self.base_url)).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    async fn create_person(&self, person: &SamplePerson) -> anyhow::Result<String> {
        let response = self
            .client
            .post(format!("{}/person", self.base_url))
            .json(person)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("HTTP {} - {}", status, body);
        }
        Ok(body)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> anyhow::Result<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?
            .error_for_status()?;
        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response JSON from {}", path))
    }

    async fn run(&self) -> anyhow::Result<()> {
        println!("\n{}🔍 Checking service status...{}", CYAN, RESET);
        if !self.check_service_health().await {
            println!("{}❌ Service unavailable.{}", RED, RESET);
            println!("{}Please ensure person-registry is running (cargo run){}", YELLOW, RESET);
            process::exit(1);
        }
        println!("{}✅ Service available{}\n", GREEN, RESET);

        let people = sample_people();
        println!("{}🚀 Creating {} people...{}\n", BOLD, people.len(), RESET);

        let started = Instant::now();
        let mut created = 0;
        for (i, person) in people.iter().enumerate() {
            match self.create_person(person).await {
                Ok(id) => {
                    created += 1;
                    println!(
                        "{}[{}/{}] ✅ {} {} ({}) -> {}{}",
                        GREEN, i + 1, people.len(), person.first_name, person.last_name, person.age, id, RESET
                    );
                }
                Err(e) => {
                    println!(
                        "{}[{}/{}] ❌ {}: {}{}",
                        RED, i + 1, people.len(), person.first_name, e, RESET
                    );
                }
            }
        }
        println!(
            "\n{}✨ Created {}/{} people in {:.1}s{}",
            BOLD, created, people.len(), started.elapsed().as_secs_f64(), RESET
        );

        let population: Vec<CityPopulation> = self.get_json("/person/populationByCity").await?;
        println!("\n{}📋 Population by city{}", BOLD, RESET);
        println!("────────────────────────────────────────");
        for row in &population {
            println!("{:<30} {:>8}", row.city.as_deref().unwrap_or("(none)"), row.count);
        }

        let oldest: Vec<OldestPerson> = self.get_json("/person/oldestPerson").await?;
        println!("\n{}📋 Oldest resident by city{}", BOLD, RESET);
        println!("────────────────────────────────────────");
        for row in &oldest {
            println!(
                "{:<20} {:<15} {:>4}",
                row.city.as_deref().unwrap_or("(none)"),
                row.oldest_person.first_name,
                row.oldest_person.age
            );
        }

        Ok(())
    }
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let base_url =
        env::var("REGISTRY_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let result = match PersonSeeder::new(base_url) {
        Ok(seeder) => seeder.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        println!("{}❌ {:#}{}", RED, e, RESET);
        process::exit(1);
    }
}
