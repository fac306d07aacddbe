//! Synthetic fallback content.
//!
//! When the upstream is unreachable, throttling us or returning garbage,
//! the portal still needs a plausible feed. The synthesizer builds one from
//! a static per-category template bank: headlines are subject ×
//! development combinations walked from a rotating offset, images come
//! from per-category pools in round-robin order, and outlets from a fixed
//! roster. Titles already surfaced are skipped so synthetic items never
//! collide with upstream ones.

// Author: kelexine (https://github.com/kelexine)

use crate::models::{ArticleSource, Category, RawArticle};
use crate::news::dedup::TitleRegistry;
use chrono::{Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Spacing between successive fallback batches.
const CALL_OFFSET_SECS: i64 = 30;
/// Spacing between items inside a batch.
const ITEM_OFFSET_SECS: i64 = 60;

pub const MIN_BATCH: usize = 10;
pub const MAX_BATCH: usize = 50;

struct CategoryBank {
    subjects: &'static [&'static str],
    developments: &'static [&'static str],
    images: &'static [&'static str],
}

const IMG: &str = "?auto=compress&cs=tinysrgb&w=800";

static GENERAL: CategoryBank = CategoryBank {
    subjects: &[
        "Conferência climática",
        "Defesa Civil",
        "Descoberta arqueológica",
        "Campanha nacional de vacinação",
        "Programa de saneamento",
        "Festival de inverno",
        "Operação nas rodovias",
        "Censo escolar",
    ],
    developments: &[
        "define metas ambiciosas para a próxima década",
        "mobiliza moradores em várias capitais",
        "ganha destaque após novos dados oficiais",
        "entra em nova fase com apoio de municípios",
        "reacende debate sobre prioridades públicas",
        "registra adesão acima do esperado",
    ],
    images: &[
        "https://images.pexels.com/photos/9324336/pexels-photo-9324336.jpeg",
        "https://images.pexels.com/photos/6069112/pexels-photo-6069112.jpeg",
        "https://images.pexels.com/photos/6193518/pexels-photo-6193518.jpeg",
        "https://images.pexels.com/photos/1550337/pexels-photo-1550337.jpeg",
    ],
};

static WORLD: CategoryBank = CategoryBank {
    subjects: &[
        "Reunião de emergência da ONU",
        "Acordo comercial entre blocos econômicos",
        "Cúpula do G20",
        "Missão humanitária internacional",
        "Negociação de cessar-fogo",
        "Eleição presidencial na Europa",
        "Tratado de cooperação ambiental",
        "Parlamento Europeu",
    ],
    developments: &[
        "marca semana de tensões diplomáticas",
        "é assinado após meses de negociação",
        "reúne líderes para discutir segurança global",
        "preocupa analistas de política externa",
        "avança com apoio de países emergentes",
        "enfrenta resistência de governos vizinhos",
    ],
    images: &[
        "https://images.pexels.com/photos/6193518/pexels-photo-6193518.jpeg",
        "https://images.pexels.com/photos/6801648/pexels-photo-6801648.jpeg",
        "https://images.pexels.com/photos/2990650/pexels-photo-2990650.jpeg",
    ],
};

static NATION: CategoryBank = CategoryBank {
    subjects: &[
        "Reforma tributária",
        "Congresso Nacional",
        "Supremo Tribunal Federal",
        "Orçamento federal",
        "Governo federal",
        "Comissão parlamentar",
        "Pacto federativo",
        "Marco regulatório do saneamento",
    ],
    developments: &[
        "entra na pauta de votação desta semana",
        "divide opiniões entre governadores",
        "recebe propostas de emendas da oposição",
        "avança após acordo entre lideranças",
        "é alvo de críticas de entidades do setor",
        "ganha novo relator no Senado",
    ],
    images: &[
        "https://images.pexels.com/photos/8846209/pexels-photo-8846209.jpeg",
        "https://images.pexels.com/photos/5668858/pexels-photo-5668858.jpeg",
        "https://images.pexels.com/photos/1550337/pexels-photo-1550337.jpeg",
    ],
};

static BUSINESS: CategoryBank = CategoryBank {
    subjects: &[
        "Ibovespa",
        "Banco Central",
        "Setor de fintechs",
        "Mercado de crédito",
        "Agronegócio",
        "Varejo eletrônico",
        "Indústria automotiva",
        "Mercado de trabalho",
    ],
    developments: &[
        "reage a novos indicadores econômicos",
        "surpreende analistas no trimestre",
        "impulsiona crescimento do setor financeiro",
        "atrai investimentos estrangeiros",
        "revisa projeções para o próximo ano",
        "registra maior alta em doze meses",
    ],
    images: &[
        "https://images.pexels.com/photos/6196984/pexels-photo-6196984.jpeg",
        "https://images.pexels.com/photos/6802049/pexels-photo-6802049.jpeg",
        "https://images.pexels.com/photos/6801874/pexels-photo-6801874.jpeg",
        "https://images.pexels.com/photos/534216/pexels-photo-534216.jpeg",
    ],
};

static TECHNOLOGY: CategoryBank = CategoryBank {
    subjects: &[
        "Inteligência artificial",
        "Computação quântica",
        "Rede 5G",
        "Startup brasileira de robótica",
        "Chip de baixo consumo",
        "Plataforma de código aberto",
        "Segurança cibernética",
        "Carro elétrico nacional",
    ],
    developments: &[
        "revoluciona diagnósticos médicos",
        "atinge novo marco histórico",
        "chega a mais cidades do interior",
        "recebe aporte milionário",
        "desperta alerta entre especialistas",
        "ganha versão para o mercado brasileiro",
    ],
    images: &[
        "https://images.pexels.com/photos/8386440/pexels-photo-8386440.jpeg",
        "https://images.pexels.com/photos/3861969/pexels-photo-3861969.jpeg",
        "https://images.pexels.com/photos/2582937/pexels-photo-2582937.jpeg",
        "https://images.pexels.com/photos/5380642/pexels-photo-5380642.jpeg",
    ],
};

static ENTERTAINMENT: CategoryBank = CategoryBank {
    subjects: &[
        "Festival de cinema",
        "Nova novela das nove",
        "Turnê de rock nacional",
        "Série brasileira de streaming",
        "Prêmio de música popular",
        "Bienal do livro",
        "Musical da Broadway em São Paulo",
        "Documentário sobre o samba",
    ],
    developments: &[
        "anuncia programação completa",
        "bate recorde de público",
        "estreia com elogios da crítica",
        "confirma datas em cinco capitais",
        "vira assunto nas redes sociais",
        "ganha prêmio internacional",
    ],
    images: &[
        "https://images.pexels.com/photos/7991579/pexels-photo-7991579.jpeg",
        "https://images.pexels.com/photos/1190298/pexels-photo-1190298.jpeg",
        "https://images.pexels.com/photos/3709369/pexels-photo-3709369.jpeg",
    ],
};

static SPORTS: CategoryBank = CategoryBank {
    subjects: &[
        "Seleção brasileira",
        "Campeonato Brasileiro",
        "Vôlei feminino",
        "Copa do Brasil",
        "Atletismo nacional",
        "Fórmula 1 em Interlagos",
        "Surfe brasileiro",
        "Basquete do NBB",
    ],
    developments: &[
        "vence e assume a liderança",
        "prepara elenco para a próxima rodada",
        "anuncia novo técnico",
        "garante vaga na fase final",
        "quebra recorde histórico",
        "enfrenta maratona de jogos decisivos",
    ],
    images: &[
        "https://images.pexels.com/photos/274422/pexels-photo-274422.jpeg",
        "https://images.pexels.com/photos/46798/pexels-photo-46798.jpeg",
        "https://images.pexels.com/photos/1618200/pexels-photo-1618200.jpeg",
    ],
};

static SCIENCE: CategoryBank = CategoryBank {
    subjects: &[
        "Telescópio espacial",
        "Pesquisa sobre a Amazônia",
        "Estudo genético inédito",
        "Missão lunar",
        "Expedição na Antártida",
        "Laboratório nacional de luz síncrotron",
        "Fóssil de dinossauro",
        "Projeto de energia de fusão",
    ],
    developments: &[
        "revela dados surpreendentes",
        "reescreve teorias estabelecidas",
        "é publicado em revista internacional",
        "recebe financiamento para nova etapa",
        "mobiliza cientistas de vários países",
        "abre caminho para novas descobertas",
    ],
    images: &[
        "https://images.pexels.com/photos/2159/flight-sky-earth-space.jpg",
        "https://images.pexels.com/photos/256262/pexels-photo-256262.jpeg",
        "https://images.pexels.com/photos/3825581/pexels-photo-3825581.jpeg",
    ],
};

static HEALTH: CategoryBank = CategoryBank {
    subjects: &[
        "Sistema Único de Saúde",
        "Nova vacina contra a dengue",
        "Ministério da Saúde",
        "Tratamento contra o câncer",
        "Programa de saúde mental",
        "Rede de hospitais universitários",
        "Campanha de doação de sangue",
        "Pesquisa sobre sono",
    ],
    developments: &[
        "amplia atendimento em todo o país",
        "mostra resultados promissores",
        "lança alerta para o inverno",
        "recebe aprovação da Anvisa",
        "beneficia milhões de pacientes",
        "orienta população sobre prevenção",
    ],
    images: &[
        "https://images.pexels.com/photos/356040/pexels-photo-356040.jpeg",
        "https://images.pexels.com/photos/40568/medical-appointment-doctor-healthcare-40568.jpeg",
        "https://images.pexels.com/photos/3786157/pexels-photo-3786157.jpeg",
    ],
};

static DESCRIPTIONS: &[&str] = &[
    "Desdobramentos envolvendo {s} chamam atenção de especialistas e autoridades.",
    "Novas informações sobre {s} repercutem entre analistas e leitores.",
    "O tema {s} volta ao centro do debate com dados divulgados nesta semana.",
    "Especialistas avaliam o impacto das mudanças ligadas a {s}.",
];

static CONTENTS: &[&str] = &[
    "Em meio à repercussão, fontes ouvidas pela reportagem detalham o que muda com {s} e quais são os próximos passos.",
    "A cobertura segue acompanhando {s}, com atualizações ao longo do dia e análise de especialistas convidados.",
    "Os números mais recentes sobre {s} indicam uma tendência que deve se manter nos próximos meses.",
];

static SOURCES: &[&str] = &[
    "Reuters Internacional",
    "Financial Times",
    "Bloomberg",
    "Wall Street Journal",
    "TechCrunch",
    "MIT Technology Review",
    "BBC News",
    "National Geographic",
    "Global News Network",
    "Agência Brasil",
];

fn bank(category: Category) -> &'static CategoryBank {
    match category {
        Category::General => &GENERAL,
        Category::World => &WORLD,
        Category::Nation => &NATION,
        Category::Business => &BUSINESS,
        Category::Technology => &TECHNOLOGY,
        Category::Entertainment => &ENTERTAINMENT,
        Category::Sports => &SPORTS,
        Category::Science => &SCIENCE,
        Category::Health => &HEALTH,
    }
}

fn fill(template: &str, subject: &str) -> String {
    template.replace("{s}", &subject.to_lowercase())
}

/// Generator of plausible placeholder articles.
pub struct FallbackSynthesizer {
    batch_size: usize,
    calls: AtomicU64,
    image_cursors: Mutex<[usize; Category::ALL.len()]>,
}

impl FallbackSynthesizer {
    /// `batch_size` is clamped to `MIN_BATCH..=MAX_BATCH`.
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.clamp(MIN_BATCH, MAX_BATCH),
            calls: AtomicU64::new(0),
            image_cursors: Mutex::new([0; Category::ALL.len()]),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches produced so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Build a batch for `category`, led by a query headline when `query`
    /// is non-blank. Titles in `titles` are skipped; the registry itself is
    /// not modified. The result is never empty.
    pub fn synthesize(
        &self,
        category: Category,
        query: Option<&str>,
        titles: &TitleRegistry,
    ) -> Vec<RawArticle> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let bank = bank(category);
        let subjects = bank.subjects.len();
        let combos = subjects * bank.developments.len();

        // (title, subject) pairs, in output order
        let mut picked: Vec<(String, String)> = Vec::with_capacity(self.batch_size);

        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            let title = format!("Últimas atualizações sobre {} geram repercussão mundial", q);
            let title = if titles.contains(&title) {
                format!("{} (edição {})", title, call)
            } else {
                title
            };
            if !titles.contains(&title) {
                picked.push((title, q.to_string()));
            }
        }

        let offset = (call as usize).wrapping_mul(self.batch_size) % combos;
        for step in 0..combos {
            if picked.len() >= self.batch_size {
                break;
            }
            let idx = (offset + step) % combos;
            let subject = bank.subjects[idx % subjects];
            let development = bank.developments[idx / subjects];
            let title = format!("{} {}", subject, development);
            if !titles.contains(&title) {
                picked.push((title, subject.to_string()));
            }
        }

        // Template bank exhausted: number the editions so the feed is
        // never empty.
        let mut edition = 0;
        while picked.len() < self.batch_size && edition < self.batch_size * 4 {
            edition += 1;
            let idx = (offset + edition) % combos;
            let subject = bank.subjects[idx % subjects];
            let development = bank.developments[idx / subjects];
            let title = format!("{} {} (edição {}.{})", subject, development, call, edition);
            if !titles.contains(&title) {
                picked.push((title, subject.to_string()));
            }
        }

        let now = Utc::now();
        let batch_offset = ChronoDuration::seconds(CALL_OFFSET_SECS.saturating_mul(call as i64));
        let images = self.next_images(category, picked.len());

        picked
            .into_iter()
            .zip(images)
            .enumerate()
            .map(|(index, ((title, subject), image))| {
                let published = now
                    - batch_offset
                    - ChronoDuration::seconds(ITEM_OFFSET_SECS * index as i64);
                let source = SOURCES[(call as usize + index) % SOURCES.len()];
                RawArticle {
                    title,
                    description: Some(fill(DESCRIPTIONS[index % DESCRIPTIONS.len()], &subject)),
                    content: Some(fill(CONTENTS[index % CONTENTS.len()], &subject)),
                    url: "#".to_string(),
                    image: Some(format!("{}{}", image, IMG)),
                    published_at: Some(published.to_rfc3339()),
                    source: ArticleSource {
                        name: source.to_string(),
                        url: String::new(),
                    },
                }
            })
            .collect()
    }

    /// Take the next `count` images of the category pool, round-robin.
    fn next_images(&self, category: Category, count: usize) -> Vec<&'static str> {
        let pool = bank(category).images;
        let mut cursors = self.image_cursors.lock();
        let cursor = &mut cursors[category as usize];
        (0..count)
            .map(|_| {
                let image = pool[*cursor % pool.len()];
                *cursor = cursor.wrapping_add(1);
                image
            })
            .collect()
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
        *self.image_cursors.lock() = [0; Category::ALL.len()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_bank_is_large_enough() {
        for category in Category::ALL {
            let bank = bank(category);
            assert!(bank.subjects.len() * bank.developments.len() >= MAX_BATCH - 2);
            assert!(!bank.images.is_empty());
        }
    }

    #[test]
    fn test_batch_size_is_clamped() {
        assert_eq!(FallbackSynthesizer::new(1).batch_size(), MIN_BATCH);
        assert_eq!(FallbackSynthesizer::new(500).batch_size(), MAX_BATCH);
        assert_eq!(FallbackSynthesizer::new(12).batch_size(), 12);
    }

    #[test]
    fn test_batch_is_bounded_and_unique() {
        let synth = FallbackSynthesizer::new(12);
        let titles = TitleRegistry::new();
        let batch = synth.synthesize(Category::Technology, None, &titles);

        assert_eq!(batch.len(), 12);
        let unique: HashSet<_> = batch.iter().map(|a| a.title.to_lowercase()).collect();
        assert_eq!(unique.len(), 12);
        assert!(batch.iter().all(|a| a.url == "#"));
    }

    #[test]
    fn test_query_headline_leads() {
        let synth = FallbackSynthesizer::new(10);
        let titles = TitleRegistry::new();
        let batch = synth.synthesize(Category::General, Some("eleições"), &titles);
        assert!(batch[0].title.contains("eleições"));
        assert_eq!(batch.len(), 10);
    }

    #[test]
    fn test_timestamps_descend() {
        let synth = FallbackSynthesizer::new(10);
        let titles = TitleRegistry::new();
        let batch = synth.synthesize(Category::Sports, None, &titles);
        let times: Vec<_> = batch.iter().map(|a| a.published().unwrap()).collect();
        for pair in times.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_images_rotate_through_pool() {
        let synth = FallbackSynthesizer::new(10);
        let titles = TitleRegistry::new();
        let pool = bank(Category::World).images;
        let batch = synth.synthesize(Category::World, None, &titles);

        for (i, article) in batch.iter().enumerate() {
            let expected = format!("{}{}", pool[i % pool.len()], IMG);
            assert_eq!(article.image.as_deref(), Some(expected.as_str()));
        }

        // The cursor carries over to the next batch
        let next = synth.synthesize(Category::World, None, &titles);
        let expected = format!("{}{}", pool[batch.len() % pool.len()], IMG);
        assert_eq!(next[0].image.as_deref(), Some(expected.as_str()));
    }

    #[test]
    fn test_used_titles_are_skipped_and_batch_never_empty() {
        let synth = FallbackSynthesizer::new(50);
        let titles = TitleRegistry::new();

        for _ in 0..4 {
            let batch = synth.synthesize(Category::Health, None, &titles);
            assert!(!batch.is_empty());
            for article in &batch {
                assert!(titles.admit(&article.title), "repeated title {}", article.title);
            }
        }
    }
}
