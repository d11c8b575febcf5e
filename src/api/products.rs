// Copyright 2024-2025 the apigee-edge contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::Method;

use crate::client::{EdgeClient, OpContext};
use crate::error::EdgeError;
use crate::model::Product;

const PRODUCTS: &str = "apiproducts";

/// API product management.
pub struct Products<'c> {
    client: &'c EdgeClient,
}

impl<'c> Products<'c> {
    pub(crate) fn new(client: &'c EdgeClient) -> Products<'c> {
        Products { client }
    }

    pub async fn get(&self, name: &str) -> Result<Product, EdgeError> {
        let ctx = OpContext::new("get", format!("product {name}"));
        let url = self.client.endpoint(&[PRODUCTS, name]);
        let builder = self.client.request(Method::GET, url).await?;
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn create(&self, product: &Product) -> Result<Product, EdgeError> {
        if product.name.is_empty() {
            return Err(EdgeError::Validation(
                "cannot create a product with no name".to_string(),
            ));
        }
        let ctx = OpContext::new("create", format!("product {}", product.name));
        let url = self.client.endpoint(&[PRODUCTS]);
        let builder = self.client.request(Method::POST, url).await?.json(product);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn update(&self, product: &Product) -> Result<Product, EdgeError> {
        if product.name.is_empty() {
            return Err(EdgeError::Validation(
                "must specify the name of the product to update".to_string(),
            ));
        }
        let ctx = OpContext::new("update", format!("product {}", product.name));
        let url = self.client.endpoint(&[PRODUCTS, &product.name]);
        let builder = self.client.request(Method::PUT, url).await?.json(product);
        self.client.execute_json(&ctx, builder).await
    }

    pub async fn delete(&self, name: &str) -> Result<(), EdgeError> {
        let ctx = OpContext::new("delete", format!("product {name}"));
        let url = self.client.endpoint(&[PRODUCTS, name]);
        let builder = self.client.request(Method::DELETE, url).await?;
        self.client.execute(&ctx, builder).await?;
        Ok(())
    }
}
