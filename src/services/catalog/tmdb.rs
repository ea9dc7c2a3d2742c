/// TMDB catalog client
///
/// API Flow:
/// 1. Genres: /genre/movie/list → id to name mapping
/// 2. Person: /search/person?query= → first matching person id
/// 3. Movies: /discover/movie?with_cast= (actors) or with_crew= (directors)
/// 4. Details: /movie/{id}?append_to_response=credits → cast, director, rating, popularity
///
/// Every lookup except discover is cached in Redis.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        Movie, PersonRole, TmdbDiscoverPage, TmdbGenreList, TmdbMovieDetails, TmdbMovieSummary,
        TmdbPersonSearch, UNKNOWN_DIRECTOR,
    },
    services::catalog::MovieCatalog,
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

const GENRE_CACHE_TTL: u64 = 86400; // 1 day
const PERSON_CACHE_TTL: u64 = 86400; // 1 day
const DETAILS_CACHE_TTL: u64 = 604800; // 1 week
const TOP_BILLED_ACTORS: usize = 5;
const UNKNOWN_GENRE: &str = "Unknown";

#[derive(Clone)]
pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    cache: Cache,
}

impl TmdbClient {
    pub fn new(cache: Cache, api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB API returned status {} for {}: {}",
                status, path, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }

    async fn genre_map(&self) -> AppResult<HashMap<u64, String>> {
        cached!(self.cache, CacheKey::GenreList, GENRE_CACHE_TTL, async {
            let list: TmdbGenreList = self
                .get_json("/genre/movie/list", &[("language", "en-US")])
                .await?;
            Ok::<_, AppError>(
                list.genres
                    .into_iter()
                    .map(|genre| (genre.id, genre.name))
                    .collect::<HashMap<u64, String>>(),
            )
        })
    }

    async fn person_id(&self, name: &str) -> AppResult<Option<u64>> {
        cached!(
            self.cache,
            CacheKey::PersonSearch(name.to_string()),
            PERSON_CACHE_TTL,
            async {
                let search: TmdbPersonSearch =
                    self.get_json("/search/person", &[("query", name)]).await?;
                Ok::<_, AppError>(search.results.first().map(|person| person.id))
            }
        )
    }

    async fn movie_details(&self, movie_id: i64) -> AppResult<TmdbMovieDetails> {
        cached!(
            self.cache,
            CacheKey::MovieDetails(movie_id),
            DETAILS_CACHE_TTL,
            async {
                self.get_json::<TmdbMovieDetails>(
                    &format!("/movie/{}", movie_id),
                    &[("append_to_response", "credits")],
                )
                .await
            }
        )
    }
}

/// Assembles a corpus movie from a discover entry and its credits
fn build_movie(
    summary: TmdbMovieSummary,
    details: &TmdbMovieDetails,
    genres: &HashMap<u64, String>,
) -> Movie {
    let actors = details
        .credits
        .cast
        .iter()
        .take(TOP_BILLED_ACTORS)
        .map(|member| member.name.clone())
        .collect();

    let director = details
        .credits
        .crew
        .iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.clone())
        .unwrap_or_else(|| UNKNOWN_DIRECTOR.to_string());

    let genre_names = summary
        .genre_ids
        .iter()
        .map(|id| {
            genres
                .get(id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_GENRE.to_string())
        })
        .collect();

    let release_year = summary.release_year();

    Movie {
        id: summary.id,
        title: summary.title,
        overview: summary.overview.unwrap_or_default(),
        release_year,
        genres: genre_names,
        actors,
        director,
        rating: details.vote_average,
        popularity: details.popularity,
    }
}

#[async_trait::async_trait]
impl MovieCatalog for TmdbClient {
    async fn movies_for_person(&self, role: PersonRole, name: &str) -> AppResult<Vec<Movie>> {
        let genres = self.genre_map().await?;

        let Some(person_id) = self.person_id(name).await? else {
            tracing::info!(name = %name, role = %role, "No TMDB person matched");
            return Ok(Vec::new());
        };

        let filter = match role {
            PersonRole::Actor => "with_cast",
            PersonRole::Director => "with_crew",
        };
        let person_id = person_id.to_string();
        let page: TmdbDiscoverPage = self
            .get_json("/discover/movie", &[(filter, person_id.as_str())])
            .await?;

        let mut tasks = Vec::with_capacity(page.results.len());
        for summary in page.results {
            let client = self.clone();
            let task = tokio::spawn(async move {
                let details = client.movie_details(summary.id).await;
                (summary, details)
            });
            tasks.push(task);
        }

        let mut movies = Vec::new();
        let mut failures = 0;
        for task in tasks {
            match task.await {
                Ok((summary, Ok(details))) => movies.push(build_movie(summary, &details, &genres)),
                Ok((summary, Err(e))) => {
                    tracing::error!(error = %e, movie_id = summary.id, "Movie details fetch failed");
                    failures += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Task join error");
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            tracing::warn!(
                success_count = movies.len(),
                error_count = failures,
                "Partial movie details fetch failure"
            );
            if movies.is_empty() {
                return Err(AppError::ExternalApi(format!(
                    "Failed to fetch details for any movie of {}",
                    name
                )));
            }
        }

        tracing::info!(
            name = %name,
            role = %role,
            movies = movies.len(),
            provider = self.name(),
            "Catalog movies fetched"
        );

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TmdbCastMember, TmdbCredits, TmdbCrewMember};

    fn genres() -> HashMap<u64, String> {
        HashMap::from([(28, "Action".to_string()), (80, "Crime".to_string())])
    }

    fn summary(genre_ids: Vec<u64>) -> TmdbMovieSummary {
        TmdbMovieSummary {
            id: 949,
            title: "Heat".to_string(),
            overview: Some("A group of professional bank robbers".to_string()),
            release_date: Some("1995-12-15".to_string()),
            genre_ids,
        }
    }

    fn details(cast: &[&str], crew: &[(&str, &str)]) -> TmdbMovieDetails {
        TmdbMovieDetails {
            vote_average: 7.9,
            popularity: 45.2,
            credits: TmdbCredits {
                cast: cast
                    .iter()
                    .map(|name| TmdbCastMember {
                        name: name.to_string(),
                    })
                    .collect(),
                crew: crew
                    .iter()
                    .map(|(name, job)| TmdbCrewMember {
                        name: name.to_string(),
                        job: job.to_string(),
                    })
                    .collect(),
            },
        }
    }

    #[test]
    fn test_build_movie_maps_all_fields() {
        let movie = build_movie(
            summary(vec![28, 80]),
            &details(
                &["Al Pacino", "Robert De Niro"],
                &[("Dante Spinotti", "Director of Photography"), ("Michael Mann", "Director")],
            ),
            &genres(),
        );

        assert_eq!(movie.id, 949);
        assert_eq!(movie.title, "Heat");
        assert_eq!(movie.release_year, Some(1995));
        assert_eq!(movie.genres, vec!["Action".to_string(), "Crime".to_string()]);
        assert_eq!(movie.actors, vec!["Al Pacino".to_string(), "Robert De Niro".to_string()]);
        assert_eq!(movie.director, "Michael Mann");
        assert_eq!(movie.rating, 7.9);
        assert_eq!(movie.popularity, 45.2);
    }

    #[test]
    fn test_build_movie_keeps_top_five_actors() {
        let cast = ["A1", "A2", "A3", "A4", "A5", "A6", "A7"];
        let movie = build_movie(summary(vec![]), &details(&cast, &[]), &genres());
        assert_eq!(movie.actors, vec!["A1", "A2", "A3", "A4", "A5"]);
    }

    #[test]
    fn test_build_movie_unknown_director_and_genre() {
        let movie = build_movie(
            summary(vec![99999]),
            &details(&[], &[("Someone", "Producer")]),
            &genres(),
        );
        assert_eq!(movie.director, UNKNOWN_DIRECTOR);
        assert_eq!(movie.genres, vec!["Unknown".to_string()]);
    }

    #[test]
    fn test_build_movie_without_overview() {
        let mut s = summary(vec![]);
        s.overview = None;
        let movie = build_movie(s, &details(&[], &[]), &genres());
        assert_eq!(movie.overview, "");
    }
}
