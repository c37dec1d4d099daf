use rand::seq::IndexedRandom;

/// A movie that can be put on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    /// Stem of the image files for this movie (`<subject_id><version>.png`).
    pub subject_id: String,
    /// Title the player has to type.
    pub answer: String,
}

impl Movie {
    /// Movie whose images are named after `subject_id`.
    pub fn new(subject_id: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            subject_id: subject_id.into(),
            answer: answer.into(),
        }
    }

    /// File name of the image for the given obscuration level.
    pub fn image_name(&self, version: u8) -> String {
        image_name(&self.subject_id, version)
    }
}

/// File name of the image for a subject at the given obscuration level.
pub fn image_name(subject_id: &str, version: u8) -> String {
    format!("{subject_id}{version}.png")
}

/// Immutable list of movies the quiz draws from.
#[derive(Debug, Clone)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
}

impl MovieCatalog {
    /// Build a catalog, falling back to the built-in list when `movies` is empty.
    pub fn new(movies: Vec<Movie>) -> Self {
        if movies.is_empty() {
            return Self::default();
        }
        Self { movies }
    }

    /// Pick a movie uniformly at random; the same movie may come up twice in a row.
    pub fn random(&self) -> Movie {
        self.movies
            .choose(&mut rand::rng())
            .cloned()
            .unwrap_or_else(|| default_movies().remove(0))
    }

    /// Number of movies.
    pub fn len(&self) -> usize {
        self.movies.len()
    }

    /// Whether the catalog holds no movie.
    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Movies in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Movie> {
        self.movies.iter()
    }
}

impl Default for MovieCatalog {
    fn default() -> Self {
        Self {
            movies: default_movies(),
        }
    }
}

/// Built-in catalog shipped with the binary.
pub fn default_movies() -> Vec<Movie> {
    vec![
        Movie::new("TheDarkKnight", "The Dark Knight"),
        Movie::new("Inception", "Inception"),
        Movie::new("Jaws", "Jaws"),
        Movie::new("TheMatrix", "The Matrix"),
        Movie::new("Titanic", "Titanic"),
        Movie::new("StarWars", "Star Wars"),
        Movie::new("Gladiator", "Gladiator"),
        Movie::new("JurassicPark", "Jurassic Park"),
        Movie::new("TheGodfather", "The Godfather"),
        Movie::new("Frozen", "Frozen"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_catalog_falls_back_to_defaults() {
        let catalog = MovieCatalog::new(Vec::new());
        assert_eq!(catalog.len(), default_movies().len());
    }

    #[test]
    fn random_pick_comes_from_the_catalog() {
        let catalog = MovieCatalog::new(vec![Movie::new("Jaws", "Jaws"), Movie::new("Up", "Up")]);
        for _ in 0..32 {
            let movie = catalog.random();
            assert!(catalog.iter().any(|candidate| candidate == &movie));
        }
    }

    #[test]
    fn image_names_follow_subject_and_version() {
        let movie = Movie::new("TheDarkKnight", "The Dark Knight");
        assert_eq!(movie.image_name(1), "TheDarkKnight1.png");
        assert_eq!(movie.image_name(4), "TheDarkKnight4.png");
    }
}
