use sqlx::{PgPool, Row};

use crate::db::DatabaseProxy;
use crate::mastery::{Item, Tier};

struct StarterWord {
    kanji: &'static str,
    kana: &'static str,
    romaji: &'static str,
    meaning: &'static str,
    example_sentence: &'static str,
    tier: Tier,
}

const STARTER_WORDS: &[StarterWord] = &[
    StarterWord { kanji: "私", kana: "わたし", romaji: "watashi", meaning: "I, me", example_sentence: "私は学生です", tier: 1 },
    StarterWord { kanji: "あなた", kana: "あなた", romaji: "anata", meaning: "you", example_sentence: "あなたは誰ですか", tier: 1 },
    StarterWord { kanji: "先生", kana: "せんせい", romaji: "sensei", meaning: "teacher", example_sentence: "先生、質問があります", tier: 1 },
    StarterWord { kanji: "学生", kana: "がくせい", romaji: "gakusei", meaning: "student", example_sentence: "彼は大学の学生です", tier: 1 },
    StarterWord { kanji: "猫", kana: "ねこ", romaji: "neko", meaning: "cat", example_sentence: "猫が好きです", tier: 1 },
    StarterWord { kanji: "犬", kana: "いぬ", romaji: "inu", meaning: "dog", example_sentence: "犬が走っています", tier: 1 },
    StarterWord { kanji: "食べる", kana: "たべる", romaji: "taberu", meaning: "to eat", example_sentence: "ご飯を食べる", tier: 1 },
    StarterWord { kanji: "見る", kana: "みる", romaji: "miru", meaning: "to see", example_sentence: "テレビを見る", tier: 1 },
    StarterWord { kanji: "本", kana: "ほん", romaji: "hon", meaning: "book", example_sentence: "本を読みます", tier: 1 },
    StarterWord { kanji: "日本", kana: "にほん", romaji: "nihon", meaning: "Japan", example_sentence: "日本に行きたい", tier: 1 },
];

/// Starter vocabulary with ids assigned from 1, for the in-memory store.
pub fn starter_vocabulary() -> Vec<Item> {
    STARTER_WORDS
        .iter()
        .zip(1..)
        .map(|(word, id)| Item {
            id,
            tier: word.tier,
            kanji: word.kanji.to_string(),
            kana: word.kana.to_string(),
            romaji: word.romaji.to_string(),
            meaning: word.meaning.to_string(),
            example_sentence: word.example_sentence.to_string(),
        })
        .collect()
}

pub fn seeding_enabled() -> bool {
    std::env::var("SEED_VOCABULARY")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false)
}

/// Inserts the starter vocabulary when the catalog table is empty and
/// returns the number of rows written.
pub async fn seed_vocabulary(proxy: &DatabaseProxy) -> Result<u64, sqlx::Error> {
    let pool = proxy.pool();

    let existing: i64 = sqlx::query(r#"SELECT COUNT(*) AS "count" FROM "vocabularies""#)
        .fetch_one(pool)
        .await?
        .try_get("count")?;

    if existing > 0 {
        tracing::debug!(existing, "vocabulary already present, skipping seed");
        return Ok(0);
    }

    insert_starter_words(pool).await?;
    tracing::info!(inserted = STARTER_WORDS.len(), "seeded starter vocabulary");
    Ok(STARTER_WORDS.len() as u64)
}

// All-or-nothing, so a failed seed leaves the table empty and is retried on
// the next start.
async fn insert_starter_words(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for word in STARTER_WORDS {
        sqlx::query(
            r#"
            INSERT INTO "vocabularies"
                ("kanji", "kana", "romaji", "meaning", "example_sentence", "difficulty_level")
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(word.kanji)
        .bind(word.kana)
        .bind(word.romaji)
        .bind(word.meaning)
        .bind(word.example_sentence)
        .bind(word.tier)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}
