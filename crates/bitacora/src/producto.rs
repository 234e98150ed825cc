//! Products and the recipes that make them.
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::registro::{escape_html, text};

/// One row of `producto/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Product {
    #[serde(rename = "Id_Producto", default)]
    pub id: Option<i64>,
    #[serde(rename = "Nombre_Producto", default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "price")]
    pub precio: f64,
    #[serde(default, deserialize_with = "text")]
    pub existencias: String,
    #[serde(default, deserialize_with = "text")]
    pub categoria: String,
}

/// One row of `productos/ingredientes/{id}`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Ingredient {
    #[serde(rename = "Nombre_Ingrediente", default, deserialize_with = "text")]
    pub name: String,
    #[serde(default, deserialize_with = "text")]
    pub cantidad: String,
    #[serde(default, deserialize_with = "text")]
    pub unidad: String,
    #[serde(default, deserialize_with = "text")]
    pub existencias: String,
}

/// Prices arrive as numbers or as decimal strings.
fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0.0,
    })
}

/// A product together with what goes into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Recipe {
    pub product: Product,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Render the product header and its ingredients table.
    pub fn html(&self) -> String {
        let product = &self.product;
        let category = match product.categoria.as_str() {
            "" => "Sin Categoría",
            category => category,
        };
        let rows: String = self
            .ingredients
            .iter()
            .map(|i| {
                format!(
                    "<tr><td>{}</td><td>{} {}</td><td>{}</td></tr>",
                    escape_html(&i.name),
                    escape_html(&i.cantidad),
                    escape_html(&i.unidad),
                    escape_html(&i.existencias),
                )
            })
            .collect();
        format!(
            r#"<b>Producto: </b>{}<br><b>Precio: </b>$ {:.2}<b> Categoría: </b>{}<br><table class="table table-sm"><thead><tr><th>Ingrediente</th><th>Cantidad Requerida</th><th>Existencias</th></tr></thead><tbody>{rows}</tbody></table>"#,
            escape_html(&product.name),
            product.precio,
            escape_html(category),
        )
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;

    #[test]
    fn product_rows() {
        let product: Product = serde_json::from_value(json!({
            "Id_Producto": 5,
            "Nombre_Producto": "Pan dulce",
            "Precio": "12.5",
            "Existencias": null
        }))
        .unwrap();
        assert_eq!(product.id, Some(5));
        assert_eq!(product.name, "Pan dulce");
        assert_eq!(product.precio, 12.5);
        assert_eq!(product.existencias, "");
        assert_eq!(product.categoria, "");

        let ingredient: Ingredient = serde_json::from_value(json!({
            "Nombre_Producto": "Pan dulce",
            "Id_Ingrediente": 2,
            "Nombre_Ingrediente": "Harina",
            "Unidad": "kg",
            "Existencias": 40,
            "Cantidad": 0.5
        }))
        .unwrap();
        assert_eq!(ingredient.name, "Harina");
        assert_eq!(ingredient.cantidad, "0.5");
        assert_eq!(ingredient.existencias, "40");
    }

    #[test]
    fn recipe_html() {
        let recipe = Recipe {
            product: Product {
                name: "Pan <dulce>".into(),
                precio: 8.0,
                ..Default::default()
            },
            ingredients: vec![Ingredient {
                name: "Harina".into(),
                cantidad: "2".into(),
                unidad: "kg".into(),
                existencias: "10".into(),
            }],
        };
        let html = recipe.html();
        assert!(html.contains("<b>Producto: </b>Pan &lt;dulce&gt;"));
        assert!(html.contains("$ 8.00"));
        assert!(html.contains("Sin Categoría"));
        assert!(html.contains("<tr><td>Harina</td><td>2 kg</td><td>10</td></tr>"));
    }
}
