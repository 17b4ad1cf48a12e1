//! Database queries for the catalog and rentals

use sqlx::{PgPool, Postgres, Transaction};

use super::{RentalFilter, StoreResult};
use crate::models::{Customer, Movie, NewCustomer, NewMovie, NewRental, Rental, RentalDetail};

/// Get a movie by its unique title
pub async fn get_movie_by_title(pool: &PgPool, title: &str) -> StoreResult<Option<Movie>> {
    let movie = sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, title, external_id, overview, release_date, image_url, inventory
        FROM movies
        WHERE title = $1
        "#,
    )
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(movie)
}

/// Get all movies in creation order
pub async fn get_movies(pool: &PgPool) -> StoreResult<Vec<Movie>> {
    let movies = sqlx::query_as::<_, Movie>(
        r#"
        SELECT id, title, external_id, overview, release_date, image_url, inventory
        FROM movies
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(movies)
}

/// Insert a movie. Title uniqueness is enforced by the table constraint.
pub async fn insert_movie(pool: &PgPool, movie: &NewMovie) -> Result<Movie, sqlx::Error> {
    sqlx::query_as::<_, Movie>(
        r#"
        INSERT INTO movies (title, external_id, overview, release_date, image_url, inventory)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, title, external_id, overview, release_date, image_url, inventory
        "#,
    )
    .bind(&movie.title)
    .bind(movie.external_id)
    .bind(&movie.overview)
    .bind(movie.release_date)
    .bind(&movie.image_url)
    .bind(movie.inventory)
    .fetch_one(pool)
    .await
}

/// Set the total inventory of a movie
pub async fn update_movie_inventory(
    pool: &PgPool,
    movie_id: i64,
    inventory: i32,
) -> StoreResult<Option<Movie>> {
    let movie = sqlx::query_as::<_, Movie>(
        r#"
        UPDATE movies
        SET inventory = $2
        WHERE id = $1
        RETURNING id, title, external_id, overview, release_date, image_url, inventory
        "#,
    )
    .bind(movie_id)
    .bind(inventory)
    .fetch_optional(pool)
    .await?;

    Ok(movie)
}

/// Get a customer by id
pub async fn get_customer(pool: &PgPool, id: i64) -> StoreResult<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, postal_code
        FROM customers
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(customer)
}

/// Get all customers in registration order
pub async fn get_customers(pool: &PgPool) -> StoreResult<Vec<Customer>> {
    let customers = sqlx::query_as::<_, Customer>(
        r#"
        SELECT id, name, postal_code
        FROM customers
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(customers)
}

/// Insert a customer
pub async fn insert_customer(pool: &PgPool, customer: &NewCustomer) -> StoreResult<Customer> {
    let customer = sqlx::query_as::<_, Customer>(
        r#"
        INSERT INTO customers (name, postal_code)
        VALUES ($1, $2)
        RETURNING id, name, postal_code
        "#,
    )
    .bind(&customer.name)
    .bind(&customer.postal_code)
    .fetch_one(pool)
    .await?;

    Ok(customer)
}

/// Get rentals matching a filter, in creation order
pub async fn get_rentals(pool: &PgPool, filter: RentalFilter) -> StoreResult<Vec<Rental>> {
    let rentals = sqlx::query_as::<_, Rental>(
        r#"
        SELECT id, movie_id, customer_id, checkout_date, due_date, returned
        FROM rentals
        WHERE ($1::BIGINT IS NULL OR movie_id = $1)
          AND ($2::BIGINT IS NULL OR customer_id = $2)
          AND ($3::BOOLEAN IS NULL OR returned = $3)
        ORDER BY id
        "#,
    )
    .bind(filter.movie_id)
    .bind(filter.customer_id)
    .bind(filter.returned)
    .fetch_all(pool)
    .await?;

    Ok(rentals)
}

/// Get rentals joined with movie title and customer details
pub async fn get_rental_details(
    pool: &PgPool,
    filter: RentalFilter,
) -> StoreResult<Vec<RentalDetail>> {
    let details = sqlx::query_as::<_, RentalDetail>(
        r#"
        SELECT
            r.id,
            r.movie_id,
            r.customer_id,
            r.checkout_date,
            r.due_date,
            r.returned,
            m.title,
            c.name,
            c.postal_code
        FROM rentals r
        JOIN movies m ON m.id = r.movie_id
        JOIN customers c ON c.id = r.customer_id
        WHERE ($1::BIGINT IS NULL OR r.movie_id = $1)
          AND ($2::BIGINT IS NULL OR r.customer_id = $2)
          AND ($3::BOOLEAN IS NULL OR r.returned = $3)
        ORDER BY r.id
        "#,
    )
    .bind(filter.movie_id)
    .bind(filter.customer_id)
    .bind(filter.returned)
    .fetch_all(pool)
    .await?;

    Ok(details)
}

/// Insert a rental that has already passed validation
pub async fn insert_rental(
    pool: &PgPool,
    movie_id: i64,
    customer_id: i64,
    rental: &NewRental,
) -> StoreResult<Rental> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        INSERT INTO rentals (movie_id, customer_id, checkout_date, due_date, returned)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, movie_id, customer_id, checkout_date, due_date, returned
        "#,
    )
    .bind(movie_id)
    .bind(customer_id)
    .bind(rental.checkout_date)
    .bind(rental.due_date)
    .bind(rental.returned)
    .fetch_one(pool)
    .await?;

    Ok(rental)
}

/// Lock a rental row for the rest of the transaction
pub async fn lock_rental(
    tx: &mut Transaction<'_, Postgres>,
    rental_id: i64,
) -> StoreResult<Option<Rental>> {
    let rental = sqlx::query_as::<_, Rental>(
        r#"
        SELECT id, movie_id, customer_id, checkout_date, due_date, returned
        FROM rentals
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(rental_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(rental)
}

/// Overwrite a rental inside a transaction
pub async fn update_rental(tx: &mut Transaction<'_, Postgres>, rental: &Rental) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE rentals
        SET movie_id = $2,
            customer_id = $3,
            checkout_date = $4,
            due_date = $5,
            returned = $6
        WHERE id = $1
        "#,
    )
    .bind(rental.id)
    .bind(rental.movie_id)
    .bind(rental.customer_id)
    .bind(rental.checkout_date)
    .bind(rental.due_date)
    .bind(rental.returned)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Mark a rental returned only if it is still outstanding.
///
/// Returns whether this statement changed the row.
pub async fn mark_returned(pool: &PgPool, rental_id: i64) -> StoreResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE rentals
        SET returned = TRUE
        WHERE id = $1
          AND returned = FALSE
        "#,
    )
    .bind(rental_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Round-trip check for health reporting
pub async fn ping(pool: &PgPool) -> StoreResult<()> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}
