use shared::domain::{Category, Product};

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400";

pub fn demo_categories() -> Vec<Category> {
    [
        ("electronics", "Electronics"),
        ("clothing", "Clothing"),
        ("home", "Home & Kitchen"),
        ("accessories", "Accessories"),
    ]
    .into_iter()
    .map(|(id, name)| Category {
        id: id.into(),
        name: name.to_string(),
        parent_id: None,
    })
    .collect()
}

pub fn demo_products() -> Vec<Product> {
    [
        ("1", "Laptop", "High-performance laptop", 999.99, "electronics", 4.5, 120),
        ("2", "Smartphone", "Latest smartphone model", 699.99, "electronics", 4.7, 250),
        ("3", "Headphones", "Noise-cancelling headphones", 199.99, "electronics", 4.3, 80),
        ("4", "T-Shirt", "Cotton t-shirt", 29.99, "clothing", 4.0, 45),
        ("5", "Jeans", "Denim jeans", 59.99, "clothing", 4.2, 67),
        ("6", "Sneakers", "Running sneakers", 89.99, "clothing", 4.6, 150),
        ("7", "Coffee Maker", "Automatic coffee maker", 149.99, "home", 4.4, 90),
        ("8", "Blender", "High-speed blender", 79.99, "home", 4.1, 55),
        ("9", "Desk Lamp", "LED desk lamp", 39.99, "home", 4.3, 70),
        ("10", "Backpack", "Travel backpack", 49.99, "accessories", 4.5, 100),
    ]
    .into_iter()
    .map(
        |(id, name, description, price, category_id, rating, review_count)| Product {
            id: id.into(),
            name: name.to_string(),
            description: description.to_string(),
            price,
            image_url: PLACEHOLDER_IMAGE.to_string(),
            category_id: category_id.into(),
            rating,
            review_count,
        },
    )
    .collect()
}
